use serde::{Deserialize, Serialize};

use crate::datasource::DataSource;

const MASK: &str = "***";

/// Connection metadata with the password removed, safe to log and persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactedConnection {
    pub source: String,
    pub engine: Option<String>,
    pub user: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub redacted: String,
}

impl RedactedConnection {
    /// Redacted view of an already-parsed data source.
    pub fn from_datasource(datasource: &DataSource) -> Self {
        Self {
            source: datasource.source_name(),
            engine: None,
            user: Some(datasource.login.clone()),
            host: Some(datasource.ip.clone()),
            port: Some(datasource.port),
            database: Some(datasource.tns.clone()),
            redacted: datasource.display_connection(),
        }
    }
}

/// Redact the password (authority or query string) from a source URI.
pub fn redact_connection_string(source: &str, uri: &str) -> RedactedConnection {
    let mut connection = RedactedConnection {
        source: source.replace(' ', "_"),
        engine: None,
        user: None,
        host: None,
        port: None,
        database: None,
        redacted: uri.to_string(),
    };

    let Some((scheme, rest)) = uri.split_once("://") else {
        connection.redacted = mask_query(uri);
        return connection;
    };
    connection.engine = Some(scheme.to_string());

    let (authority, tail) = match rest.find(['/', '?']) {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };
    let (credentials, host_port) = match authority.rsplit_once('@') {
        Some((credentials, host_port)) => (Some(credentials), host_port),
        None => (None, authority),
    };

    let masked_credentials = credentials.map(|credentials| match credentials.split_once(':') {
        Some((user, _)) => {
            connection.user = Some(user.to_string());
            format!("{user}:{MASK}@")
        }
        None => {
            connection.user = Some(credentials.to_string());
            format!("{credentials}@")
        }
    });

    match host_port.rsplit_once(':') {
        Some((host, port)) => {
            connection.host = Some(host.to_string());
            connection.port = port.parse().ok();
        }
        None if !host_port.is_empty() => connection.host = Some(host_port.to_string()),
        None => {}
    }

    let database = tail
        .strip_prefix('/')
        .and_then(|path| path.split('?').next())
        .filter(|db| !db.is_empty());
    connection.database = database.map(str::to_string);

    connection.redacted = format!(
        "{scheme}://{}{host_port}{}",
        masked_credentials.unwrap_or_default(),
        mask_query(tail)
    );
    connection
}

fn mask_query(text: &str) -> String {
    let Some((base, query)) = text.split_once('?') else {
        return text.to_string();
    };

    let params: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if is_sensitive_key(key) => format!("{key}={MASK}"),
            _ => pair.to_string(),
        })
        .collect();
    format!("{base}?{}", params.join("&"))
}

fn is_sensitive_key(key: &str) -> bool {
    matches!(
        key.to_ascii_lowercase().as_str(),
        "password" | "pass" | "pwd" | "token"
    )
}
