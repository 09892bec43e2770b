// Table-valued pragma functions need sqlite 3.16+. The second argument selects
// the attached schema.
pub(crate) const TABLE_COLUMNS_QUERY: &str = r#"
SELECT name, type, "notnull", cid
FROM pragma_table_info(?1, ?2)
ORDER BY cid ASC;
"#;
