use lakegen_core::{
    infer, Clock, DataSource, ProfileBuilder, ProfileDocument, RawTableFacts, Result,
    PROFILE_TIMESTAMP_FORMAT,
};

use crate::introspector::{Connector, SchemaIntrospector};
use crate::options::ProfileOptions;

fn timestamp(clock: &dyn Clock) -> String {
    clock.now().format(PROFILE_TIMESTAMP_FORMAT).to_string()
}

/// Profile every non-excluded table of one data source.
///
/// Never fails: connection and catalog errors end up in the document's
/// `error` field, with partially profiled tables discarded.
pub async fn profile_datasource<C: Connector>(
    connector: &C,
    datasource: DataSource,
    options: &ProfileOptions,
    clock: &dyn Clock,
) -> ProfileDocument {
    let source = datasource.source_name();
    let schema = datasource.schema.clone();
    tracing::info!(
        event = "profile_source_start",
        source = %source,
        connection = %datasource.display_connection()
    );

    let mut builder = ProfileBuilder::start(datasource.clone(), timestamp(clock))
        .with_run_info(options.user.clone(), options.working_directory.clone());

    let session = match connect_with_retry(connector, &datasource, options.max_attempts).await {
        Ok(session) => session,
        Err(err) => {
            tracing::error!(event = "profile_source_unreachable", source = %source, error = %err);
            return builder.seal_failed(timestamp(clock), err.to_string());
        }
    };

    if let Err(err) = profile_tables(&session, &schema, options, &mut builder).await {
        tracing::error!(
            event = "profile_source_aborted",
            source = %source,
            discarded_tables = builder.table_count(),
            error = %err
        );
        return builder.seal_failed(timestamp(clock), err.to_string());
    }

    let direct = session.probe_direct_path_permission().await;
    tracing::info!(
        event = "profile_source_done",
        source = %source,
        tables = builder.table_count(),
        direct
    );
    builder.seal(timestamp(clock), direct)
}

/// Profile sources one after another; one document per source, in input order.
pub async fn profile_all<C: Connector>(
    connector: &C,
    datasources: Vec<DataSource>,
    options: &ProfileOptions,
    clock: &dyn Clock,
) -> Vec<ProfileDocument> {
    let mut documents = Vec::with_capacity(datasources.len());
    for datasource in datasources {
        documents.push(profile_datasource(connector, datasource, options, clock).await);
    }
    documents
}

async fn connect_with_retry<C: Connector>(
    connector: &C,
    datasource: &DataSource,
    max_attempts: u32,
) -> Result<C::Session> {
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match connector.connect(datasource).await {
            Ok(session) => return Ok(session),
            Err(err) => {
                tracing::warn!(
                    event = "connect_failed",
                    source = %datasource.source_name(),
                    attempt,
                    max_attempts,
                    error = %err
                );
                if attempt >= max_attempts {
                    return Err(err);
                }
                attempt += 1;
            }
        }
    }
}

async fn profile_tables<S: SchemaIntrospector>(
    session: &S,
    schema: &str,
    options: &ProfileOptions,
    builder: &mut ProfileBuilder,
) -> Result<()> {
    let tables = session.list_tables(schema).await?;
    for table in tables {
        if options.is_excluded(schema, &table) {
            tracing::info!(event = "table_excluded", schema, table = %table);
            continue;
        }

        let facts = gather_facts(session, schema, &table).await?;
        tracing::debug!(event = "table_profiled", schema, table = %table);
        builder.push_table(infer(facts));
    }
    Ok(())
}

async fn gather_facts<S: SchemaIntrospector>(
    session: &S,
    schema: &str,
    table: &str,
) -> Result<RawTableFacts> {
    Ok(RawTableFacts {
        table: table.to_string(),
        columns: session.get_columns(schema, table).await?,
        primary_keys: session.get_primary_keys(schema, table).await?,
        unique_keys: session.get_unique_keys(schema, table).await?,
        indexed_columns: session.get_indexed_columns(schema, table).await?,
        row_stats: session.get_row_stats(schema, table).await?,
        direct: false,
    })
}
