/// A small segmented table: 2 `PF` rows, 2 `PJ` rows and one row without a
/// segment. `email` is filled on 3 of 5 rows and `legacy_code` on none.
pub const BORROWERS_FIXTURE: &str = "
CREATE TABLE borrowers (
    id INTEGER NOT NULL,
    c1_entity_type TEXT,
    cpf TEXT,
    email TEXT,
    renda_mensal REAL,
    legacy_code TEXT
);
INSERT INTO borrowers VALUES (1, 'PF', '11122233344', 'ana@example.com', 3500.0, NULL);
INSERT INTO borrowers VALUES (2, 'PF', '55566677788', NULL, NULL, NULL);
INSERT INTO borrowers VALUES (3, 'PJ', NULL, 'fin@acme.example', 90000.0, NULL);
INSERT INTO borrowers VALUES (4, 'PJ', NULL, 'ops@acme.example', NULL, NULL);
INSERT INTO borrowers VALUES (5, NULL, '99988877766', NULL, 1200.0, NULL);
";

/// Distinct segment labels produced by the fixture, `__all__` excluded.
pub const BORROWERS_SEGMENTS: &[&str] = &["(null)", "PF", "PJ"];

/// A build script over the fixture; `borrowers b` is the sampling source.
pub const ENRICHED_QUERY: &str = "
-- enrichment over every borrower
SELECT b.id, b.c1_entity_type, UPPER(b.email) AS email_upper
FROM borrowers b
WHERE b.id > 0;
";
