pub(crate) const SHOW_SERVER_VERSION_QUERY: &str = "SHOW server_version";

// Unqualified relations resolve against the session's current schema.
pub(crate) const TABLE_COLUMNS_QUERY: &str = r#"
SELECT
  column_name::text AS column_name,
  data_type::text AS data_type,
  (is_nullable = 'YES') AS nullable,
  ordinal_position::int4 AS ordinal_position
FROM information_schema.columns
WHERE table_schema = COALESCE($1::text, current_schema())
  AND table_name = $2::text
ORDER BY ordinal_position ASC;
"#;
