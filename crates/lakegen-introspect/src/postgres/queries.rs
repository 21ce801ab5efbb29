use sqlx::PgPool;

use lakegen_core::{Error, Result};

fn db_error(err: sqlx::Error) -> Error {
    Error::Db(err.to_string())
}

pub async fn list_tables(pool: &PgPool, schema: &str) -> Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(
        r#"
        select c.relname::text
        from pg_class c
        join pg_namespace n on n.oid = c.relnamespace
        where n.nspname = $1
          and c.relkind in ('r','p')
        order by c.relname
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await
    .map_err(db_error)
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawColumn {
    pub name: String,
    pub data_type: String,
    pub ordinal: i32,
}

pub async fn list_columns(pool: &PgPool, schema: &str, table: &str) -> Result<Vec<RawColumn>> {
    sqlx::query_as::<_, RawColumn>(
        r#"
        select
          column_name::text as name,
          upper(data_type::text) as data_type,
          ordinal_position::int4 as ordinal
        from information_schema.columns
        where table_schema = $1
          and table_name = $2
        order by ordinal_position
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(db_error)
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawColumnComment {
    pub name: String,
    pub comment: String,
}

pub async fn list_column_comments(
    pool: &PgPool,
    schema: &str,
    table: &str,
) -> Result<Vec<RawColumnComment>> {
    sqlx::query_as::<_, RawColumnComment>(
        r#"
        select
          a.attname::text as name,
          d.description as comment
        from pg_attribute a
        join pg_class c on c.oid = a.attrelid
        join pg_namespace n on n.oid = c.relnamespace
        join pg_description d on d.objoid = c.oid and d.objsubid = a.attnum
        where n.nspname = $1
          and c.relname = $2
          and a.attnum > 0
          and not a.attisdropped
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(db_error)
}

/// Key columns of one constraint type (`p` or `u`), in constraint position order.
pub async fn list_constraint_columns(
    pool: &PgPool,
    schema: &str,
    table: &str,
    contype: &str,
) -> Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(
        r#"
        select a.attname::text
        from pg_constraint con
        join pg_class c on c.oid = con.conrelid
        join pg_namespace n on n.oid = c.relnamespace
        cross join lateral unnest(con.conkey) with ordinality as k(attnum, position)
        join pg_attribute a on a.attrelid = c.oid and a.attnum = k.attnum
        where n.nspname = $1
          and c.relname = $2
          and con.contype::text = $3
        order by con.conname, k.position
        "#,
    )
    .bind(schema)
    .bind(table)
    .bind(contype)
    .fetch_all(pool)
    .await
    .map_err(db_error)
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawIndexedColumn {
    pub name: String,
    pub is_unique: bool,
}

pub async fn list_indexed_columns(
    pool: &PgPool,
    schema: &str,
    table: &str,
) -> Result<Vec<RawIndexedColumn>> {
    sqlx::query_as::<_, RawIndexedColumn>(
        r#"
        select
          a.attname::text as name,
          i.indisunique as is_unique
        from pg_index i
        join pg_class c on c.oid = i.indrelid
        join pg_class ic on ic.oid = i.indexrelid
        join pg_namespace n on n.oid = c.relnamespace
        cross join lateral unnest(i.indkey::int2[]) with ordinality as k(attnum, position)
        join pg_attribute a on a.attrelid = c.oid and a.attnum = k.attnum
        where n.nspname = $1
          and c.relname = $2
        order by ic.relname, k.position
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(db_error)
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawRowStats {
    pub num_rows: Option<i64>,
    pub avg_row_len: Option<i64>,
}

pub async fn fetch_row_stats(
    pool: &PgPool,
    schema: &str,
    table: &str,
) -> Result<Option<RawRowStats>> {
    sqlx::query_as::<_, RawRowStats>(
        r#"
        select
          case when c.reltuples < 0 then null else c.reltuples::int8 end as num_rows,
          (
            select sum(s.avg_width)::int8
            from pg_stats s
            where s.schemaname = n.nspname
              and s.tablename = c.relname
          ) as avg_row_len
        from pg_class c
        join pg_namespace n on n.oid = c.relnamespace
        where n.nspname = $1
          and c.relname = $2
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_optional(pool)
    .await
    .map_err(db_error)
}

/// Reads a superuser-only catalog; success means bulk extraction is allowed.
pub async fn probe_superuser_catalog(pool: &PgPool) -> Result<()> {
    sqlx::query("select 1 from pg_catalog.pg_authid limit 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(db_error)
}
