//! Bulk member import from CSV-style payloads.
//!
//! Rows refer to each other by email before any member ids exist, so all
//! structural checks here run on the email -> manager email mapping.
//! Validation never stops at the first problem; it produces a report.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::MemberId;

use super::manager_chain::find_cycle_through;
use super::{ImportError, ImportParseError, Member, MemberRole};

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Returns true if `value` looks like a deliverable email address.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

/// Normalizes an email for comparison.
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

// ════════════════════════════════════════════════════════════════════════════════
// Raw table
// ════════════════════════════════════════════════════════════════════════════════

/// One data record as read from the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImportRecord {
    /// 1-based line the record starts on.
    pub line: usize,
    pub fields: Vec<String>,
}

/// Header plus records, before any interpretation of columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImportTable {
    pub headers: Vec<String>,
    pub records: Vec<RawImportRecord>,
}

impl RawImportTable {
    /// Reads a CSV payload.
    ///
    /// Supports double-quoted fields with `""` escapes and embedded commas or
    /// newlines. Blank lines are skipped and a leading byte-order mark is
    /// ignored. Short rows are padded with empty fields when read.
    pub fn from_csv(text: &str) -> Result<Self, ImportParseError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut rows: Vec<RawImportRecord> = Vec::new();
        let mut fields: Vec<String> = Vec::new();
        let mut field = String::new();
        let mut in_quotes = false;
        let mut line = 1;
        let mut record_line = 1;
        let mut quote_line = 1;

        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            if in_quotes {
                match c {
                    '"' if chars.peek() == Some(&'"') => {
                        chars.next();
                        field.push('"');
                    }
                    '"' => in_quotes = false,
                    '\n' => {
                        line += 1;
                        field.push('\n');
                    }
                    _ => field.push(c),
                }
                continue;
            }
            match c {
                '"' if field.trim().is_empty() => {
                    field.clear();
                    in_quotes = true;
                    quote_line = line;
                }
                ',' => fields.push(std::mem::take(&mut field)),
                '\r' => {}
                '\n' => {
                    fields.push(std::mem::take(&mut field));
                    Self::push_record(&mut rows, std::mem::take(&mut fields), record_line);
                    line += 1;
                    record_line = line;
                }
                _ => field.push(c),
            }
        }

        if in_quotes {
            return Err(ImportParseError::UnterminatedQuote { line: quote_line });
        }
        if !field.is_empty() || !fields.is_empty() {
            fields.push(field);
            Self::push_record(&mut rows, fields, record_line);
        }

        let mut rows = rows.into_iter();
        let header = rows.next().ok_or(ImportParseError::Empty)?;

        Ok(Self {
            headers: header.fields.into_iter().map(|h| h.trim().to_string()).collect(),
            records: rows.collect(),
        })
    }

    fn push_record(rows: &mut Vec<RawImportRecord>, fields: Vec<String>, line: usize) {
        if fields.iter().all(|f| f.trim().is_empty()) {
            return;
        }
        rows.push(RawImportRecord { line, fields });
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Column mapping
// ════════════════════════════════════════════════════════════════════════════════

/// Positions of the recognised columns within a header.
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    email: usize,
    manager_email: usize,
    name: Option<usize>,
    title: Option<usize>,
    role: Option<usize>,
}

impl ColumnMap {
    /// Maps headers case-insensitively, ignoring spaces and punctuation, so
    /// `managerEmail`, `Manager Email` and `manager_email` all match.
    fn from_headers(headers: &[String]) -> Result<Self, ImportParseError> {
        let keys: Vec<String> = headers
            .iter()
            .map(|h| {
                h.chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .collect::<String>()
                    .to_ascii_lowercase()
            })
            .collect();
        let find = |key: &str| keys.iter().position(|k| k == key);

        Ok(Self {
            email: find("email").ok_or(ImportParseError::MissingColumn("email"))?,
            manager_email: find("manageremail")
                .ok_or(ImportParseError::MissingColumn("managerEmail"))?,
            name: find("name"),
            title: find("title"),
            role: find("role"),
        })
    }
}

fn cell(fields: &[String], index: usize) -> &str {
    fields.get(index).map(|f| f.trim()).unwrap_or("")
}

fn optional_cell(fields: &[String], index: Option<usize>) -> Option<String> {
    index
        .map(|i| cell(fields, i))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// ════════════════════════════════════════════════════════════════════════════════
// Report
// ════════════════════════════════════════════════════════════════════════════════

/// A parsed import row. Emails are normalized to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRow {
    pub line: usize,
    pub email: String,
    pub manager_email: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub role: MemberRole,
}

impl ImportRow {
    /// Builds the member record this row describes once ids are known.
    pub fn to_member(&self, id: MemberId, manager_id: Option<MemberId>, is_invited: bool) -> Member {
        Member {
            id,
            manager_id,
            role: self.role,
            is_invited,
            email: self.email.clone(),
            name: self.name.clone(),
            title: self.title.clone(),
        }
    }
}

/// Parsed rows plus every validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub rows: Vec<ImportRow>,
    pub errors: Vec<ImportError>,
}

impl ImportReport {
    /// True when the import can be applied as-is.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Parser
// ════════════════════════════════════════════════════════════════════════════════

/// Options controlling import validation.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Report managers that match neither a row nor a known member.
    /// When false they are accepted and the member becomes a root.
    pub strict_manager_resolution: bool,
    /// Reject the whole payload above this many data rows.
    pub max_rows: Option<usize>,
}

/// Parses and validates member import payloads.
#[derive(Debug, Clone, Default)]
pub struct MemberImportParser {
    options: ImportOptions,
    known_emails: HashSet<String>,
}

impl MemberImportParser {
    pub fn new(options: ImportOptions) -> Self {
        Self {
            options,
            known_emails: HashSet::new(),
        }
    }

    /// Emails of existing members that import rows may name as manager.
    pub fn with_known_emails<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.known_emails
            .extend(emails.into_iter().map(|e| normalize_email(e.as_ref())));
        self
    }

    /// Reads and validates a CSV payload.
    pub fn parse_csv(&self, text: &str) -> Result<ImportReport, ImportParseError> {
        let table = RawImportTable::from_csv(text)?;
        self.parse_and_validate(&table)
    }

    /// Interprets and validates an already-split table.
    ///
    /// Fails only when the table cannot be interpreted at all (missing
    /// `email` or `managerEmail` column, too many rows). Everything else is
    /// reported in the returned [`ImportReport`].
    pub fn parse_and_validate(&self, table: &RawImportTable) -> Result<ImportReport, ImportParseError> {
        let columns = ColumnMap::from_headers(&table.headers)?;
        if let Some(max) = self.options.max_rows {
            if table.records.len() > max {
                return Err(ImportParseError::TooManyRows {
                    max,
                    actual: table.records.len(),
                });
            }
        }

        let mut rows = Vec::with_capacity(table.records.len());
        let mut errors = Vec::new();
        let mut first_line: HashMap<String, usize> = HashMap::new();

        for record in &table.records {
            let line = record.line;
            let raw_email = cell(&record.fields, columns.email);
            if raw_email.is_empty() {
                errors.push(ImportError::invalid_email("email", "").at_line(line));
                continue;
            }
            let email = normalize_email(raw_email);
            if !is_valid_email(&email) {
                errors.push(ImportError::invalid_email("email", raw_email).at_line(line));
            }

            let raw_manager = cell(&record.fields, columns.manager_email);
            let manager_email = if raw_manager.is_empty() {
                None
            } else {
                if !is_valid_email(&normalize_email(raw_manager)) {
                    errors.push(ImportError::invalid_email("managerEmail", raw_manager).at_line(line));
                }
                Some(normalize_email(raw_manager))
            };

            let role = match optional_cell(&record.fields, columns.role) {
                None => MemberRole::default(),
                Some(value) => value.parse().unwrap_or_else(|_| {
                    errors.push(ImportError::invalid_role(&value).at_line(line));
                    MemberRole::default()
                }),
            };

            match first_line.get(&email) {
                Some(&first) => errors.push(ImportError::duplicate_email(&email, first).at_line(line)),
                None => {
                    first_line.insert(email.clone(), line);
                }
            }

            rows.push(ImportRow {
                line,
                email,
                manager_email,
                name: optional_cell(&record.fields, columns.name),
                title: optional_cell(&record.fields, columns.title),
                role,
            });
        }

        errors.extend(self.structural_errors(&rows, &first_line));
        errors.sort_by_key(|e| e.line);

        Ok(ImportReport { rows, errors })
    }

    /// Self-management, manager loops and (in strict mode) unresolved managers.
    fn structural_errors(&self, rows: &[ImportRow], first_line: &HashMap<String, usize>) -> Vec<ImportError> {
        // First row for an email wins; duplicates were already reported.
        let manager_of: HashMap<&str, Option<&str>> = rows
            .iter()
            .filter(|row| first_line.get(&row.email) == Some(&row.line))
            .map(|row| (row.email.as_str(), row.manager_email.as_deref()))
            .collect();

        let mut errors = Vec::new();
        for row in rows {
            let Some(manager) = row.manager_email.as_deref() else {
                continue;
            };
            if manager == row.email {
                errors.push(
                    ImportError::circular_reference(&row.email, vec![row.email.clone(), row.email.clone()])
                        .at_line(row.line),
                );
                continue;
            }
            if !manager_of.contains_key(manager) && !self.known_emails.contains(manager) {
                if self.options.strict_manager_resolution {
                    errors.push(ImportError::unresolved_manager(&row.email, manager).at_line(row.line));
                }
                continue;
            }
            if first_line.get(&row.email) != Some(&row.line) {
                continue;
            }
            let origin = row.email.as_str();
            if let Some(chain) = find_cycle_through(&origin, |email| manager_of.get(email).copied().flatten()) {
                let chain = chain.into_iter().map(str::to_string).collect();
                errors.push(ImportError::circular_reference(origin, chain).at_line(row.line));
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::org::{ImportErrorCode, OrgHierarchyBuilder};

    fn parse(csv: &str) -> ImportReport {
        MemberImportParser::default().parse_csv(csv).unwrap()
    }

    fn codes(report: &ImportReport) -> Vec<ImportErrorCode> {
        report.errors.iter().map(|e| e.code).collect()
    }

    #[test]
    fn email_pattern_accepts_common_addresses() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last+tag@sub.example.co.uk"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("a@nodot"));
        assert!(!is_valid_email("spaces in@x.com"));
    }

    #[test]
    fn csv_reader_handles_quotes_and_crlf() {
        let table = RawImportTable::from_csv(
            "email,managerEmail,name\r\n\"a@x.com\",b@x.com,\"Lovelace, Ada\"\r\nb@x.com,,\"Say \"\"Hi\"\"\"\r\n",
        )
        .unwrap();

        assert_eq!(table.headers, vec!["email", "managerEmail", "name"]);
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].fields[2], "Lovelace, Ada");
        assert_eq!(table.records[1].fields[2], "Say \"Hi\"");
        assert_eq!(table.records[1].line, 3);
    }

    #[test]
    fn csv_reader_tracks_lines_across_quoted_newlines_and_blank_lines() {
        let table =
            RawImportTable::from_csv("email,managerEmail,title\n\na@x.com,,\"Head of\nPeople\"\nb@x.com,a@x.com,\n")
                .unwrap();
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].line, 3);
        assert_eq!(table.records[0].fields[2], "Head of\nPeople");
        assert_eq!(table.records[1].line, 5);
    }

    #[test]
    fn csv_reader_rejects_unterminated_quote() {
        let err = RawImportTable::from_csv("email,managerEmail\n\"a@x.com,\n").unwrap_err();
        assert_eq!(err, ImportParseError::UnterminatedQuote { line: 2 });
    }

    #[test]
    fn empty_payload_is_fatal() {
        assert_eq!(
            MemberImportParser::default().parse_csv("").unwrap_err(),
            ImportParseError::Empty
        );
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let err = MemberImportParser::default()
            .parse_csv("email,name\na@x.com,Alice\n")
            .unwrap_err();
        assert_eq!(err, ImportParseError::MissingColumn("managerEmail"));

        let err = MemberImportParser::default()
            .parse_csv("mail,managerEmail\na@x.com,\n")
            .unwrap_err();
        assert_eq!(err, ImportParseError::MissingColumn("email"));
    }

    #[test]
    fn headers_match_case_insensitively_in_any_order() {
        let report = parse("Name,Manager Email,EMAIL,Role\nAlice,b@x.com,a@x.com,Admin\nBob,,b@x.com,\n");

        assert!(report.is_clean(), "{:?}", report.errors);
        assert_eq!(report.rows[0].email, "a@x.com");
        assert_eq!(report.rows[0].manager_email.as_deref(), Some("b@x.com"));
        assert_eq!(report.rows[0].role, MemberRole::Admin);
        assert_eq!(report.rows[1].role, MemberRole::Member);
    }

    #[test]
    fn too_many_rows_is_fatal() {
        let parser = MemberImportParser::new(ImportOptions {
            max_rows: Some(1),
            ..Default::default()
        });
        let err = parser
            .parse_csv("email,managerEmail\na@x.com,\nb@x.com,\n")
            .unwrap_err();
        assert_eq!(err, ImportParseError::TooManyRows { max: 1, actual: 2 });
    }

    #[test]
    fn invalid_emails_are_reported_with_line_numbers() {
        let report = parse("email,managerEmail\nnot-an-email,b@x.com\nb@x.com,boss\n,b@x.com\n");

        assert_eq!(
            codes(&report),
            vec![
                ImportErrorCode::InvalidEmail,
                ImportErrorCode::InvalidEmail,
                ImportErrorCode::InvalidEmail,
            ]
        );
        let lines: Vec<_> = report.errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![Some(2), Some(3), Some(4)]);
        // the blank-email row cannot become a member
        assert_eq!(report.rows.len(), 2);
    }

    #[test]
    fn invalid_role_is_reported_and_defaults_to_member() {
        let report = parse("email,managerEmail,role\na@x.com,,superuser\n");
        assert_eq!(codes(&report), vec![ImportErrorCode::InvalidRole]);
        assert_eq!(report.rows[0].role, MemberRole::Member);
    }

    #[test]
    fn duplicate_email_is_reported_on_later_row() {
        let report = parse("email,managerEmail\na@x.com,\nA@X.com,\n");
        assert_eq!(codes(&report), vec![ImportErrorCode::DuplicateEmail]);
        assert_eq!(report.errors[0].line, Some(3));
    }

    #[test]
    fn self_manager_is_a_circular_reference() {
        let report = parse("email,managerEmail\na@x.com,A@x.com\n");
        assert_eq!(codes(&report), vec![ImportErrorCode::CircularReference]);
        assert_eq!(report.errors[0].subject, "a@x.com");
    }

    #[test]
    fn manager_loop_is_reported_for_each_member_in_it() {
        let report = parse(
            "email,managerEmail\na@x.com,b@x.com\nb@x.com,c@x.com\nc@x.com,a@x.com\nd@x.com,\n",
        );

        assert_eq!(report.errors.len(), 3);
        assert!(report.errors.iter().all(|e| e.code == ImportErrorCode::CircularReference));
        assert_eq!(report.errors[0].chain, vec!["a@x.com", "b@x.com", "c@x.com", "a@x.com"]);
        assert_eq!(report.rows.len(), 4);
    }

    #[test]
    fn unresolved_manager_is_only_an_error_in_strict_mode() {
        let csv = "email,managerEmail\na@x.com,outside@x.com\n";
        assert!(parse(csv).is_clean());

        let strict = MemberImportParser::new(ImportOptions {
            strict_manager_resolution: true,
            ..Default::default()
        });
        let report = strict.parse_csv(csv).unwrap();
        assert_eq!(codes(&report), vec![ImportErrorCode::UnresolvedManager]);

        let report = strict
            .clone()
            .with_known_emails(["Outside@x.com"])
            .parse_csv(csv)
            .unwrap();
        assert!(report.is_clean());
    }

    #[test]
    fn every_problem_is_collected_in_one_pass() {
        let report = parse(
            "email,managerEmail,role\nbad,,\na@x.com,a@x.com,\nb@x.com,,boss\nb@x.com,,\n",
        );
        assert_eq!(
            codes(&report),
            vec![
                ImportErrorCode::InvalidEmail,
                ImportErrorCode::CircularReference,
                ImportErrorCode::InvalidRole,
                ImportErrorCode::DuplicateEmail,
            ]
        );
    }

    #[test]
    fn parsed_rows_feed_the_hierarchy_after_resolution() {
        let report = parse("email,managerEmail,name\na@x.com,b@x.com,Alice\nb@x.com,,Bob\n");
        assert_eq!(report.rows.len(), 2);
        assert!(report.is_clean());

        let resolve = |email: &str| MemberId::new(email.split('@').next().unwrap()).unwrap();
        let members: Vec<Member> = report
            .rows
            .iter()
            .map(|row| row.to_member(resolve(&row.email), row.manager_email.as_deref().map(resolve), true))
            .collect();

        let h = OrgHierarchyBuilder::build(&members);
        assert_eq!(h.roots.len(), 1);
        assert_eq!(h.roots[0].member.display_name(), "Bob");
        assert_eq!(h.roots[0].direct_reports.len(), 1);
        assert_eq!(h.roots[0].direct_reports[0].member.display_name(), "Alice");
    }
}
