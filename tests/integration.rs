//! Integration tests: record stores on disk through enrichment, filters,
//! charts, search and export.

use std::fs;
use std::path::{Path, PathBuf};

use amat::chart::{Frequency, JsonChartWriter, PieOptions, PlotOptions};
use amat::prelude::*;
use amat::search::{HIGHLIGHT_END, HIGHLIGHT_START};
use chrono::{NaiveDate, TimeZone, Utc};
use tempfile::TempDir;

const MESSAGES_CSV: &str = "\
chat_id,guid,text,is_from_me,date_utc,service
1,a,hey mom,1,2019-01-01 20:00:00,iMessage
1,b,frabjous day!,0,2019-01-01 20:05:00,iMessage
2,c,what time,1,2019-01-02 18:00:00,SMS
3,d,,0,2019-02-10 09:00:00,iMessage
2,e,Frabjous indeed,0,2019-03-01 17:30:00,SMS
9,f,who is this,0,2019-03-05 12:00:00,SMS
";

const MESSAGES_JSON: &str = r#"[
  {"chat_id": 1, "guid": "a", "text": "hey mom", "is_from_me": 1, "date_utc": "2019-01-01 20:00:00", "service": "iMessage"},
  {"chat_id": 1, "guid": "b", "text": "frabjous day!", "is_from_me": 0, "date_utc": "2019-01-01 20:05:00", "service": "iMessage"},
  {"chat_id": 2, "guid": "c", "text": "what time", "is_from_me": true, "date_utc": "2019-01-02T18:00:00Z", "service": "SMS"},
  {"chat_id": 3, "guid": "d", "text": null, "is_from_me": false, "date_utc": "2019-02-10 09:00:00", "service": "iMessage"},
  {"chat_id": 2, "guid": "e", "text": "Frabjous indeed", "is_from_me": 0, "date_utc": "2019-03-01 17:30:00", "service": "SMS"},
  {"chat_id": 9, "guid": "f", "text": "who is this", "is_from_me": 0, "date_utc": "2019-03-05 12:00:00", "service": "SMS"}
]"#;

const ID_MAP: &str = "1: Mom\n2: Dad\n3: \"Book Club\"\n";

// =============================================================================
// Fixtures
// =============================================================================

struct Archive {
    dir: TempDir,
}

impl Archive {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("chat_df.csv"), MESSAGES_CSV).unwrap();
        fs::write(dir.path().join("chat_df.json"), MESSAGES_JSON).unwrap();
        fs::write(dir.path().join("id_map.yaml"), ID_MAP).unwrap();

        let jsonl: Vec<String> = serde_json::from_str::<Vec<serde_json::Value>>(MESSAGES_JSON)
            .unwrap()
            .iter()
            .map(|v| v.to_string())
            .collect();
        fs::write(dir.path().join("chat_df.jsonl"), jsonl.join("\n")).unwrap();

        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn options(&self) -> LoadOptions {
        LoadOptions::new().with_id_map(self.path("id_map.yaml"))
    }

    fn table(&self) -> MessageTable {
        load_path(self.path("chat_df.csv"), &self.options()).unwrap()
    }
}

fn contacts(table: &MessageTable) -> Vec<&str> {
    table.iter().map(|m| m.contact().unwrap_or("")).collect()
}

fn guids(table: &MessageTable) -> Vec<&str> {
    table.iter().map(|m| m.guid.as_str()).collect()
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_load_csv_with_identity_map() {
    let archive = Archive::new();
    let table = archive.table();

    assert_eq!(table.len(), 6);
    assert_eq!(
        contacts(&table),
        vec!["Mom", "Mom", "Dad", "Book Club", "Dad", "other"]
    );
    assert!(table.has_field("contact"));
    assert!(table.has_field("service"));
    assert_eq!(table.columns().last().map(String::as_str), Some("service"));

    let empty = &table.messages()[3];
    assert!(empty.text.is_none());
    assert_eq!(empty.length, 0);
    assert_eq!(empty.ioicon(), "📢");
    assert_eq!(table.messages()[0].ioicon(), "💬");
}

#[test]
fn test_load_without_identity_map_has_no_contact() {
    let archive = Archive::new();
    let table = load_path(archive.path("chat_df.csv"), &LoadOptions::new()).unwrap();

    assert_eq!(table.len(), 6);
    assert!(!table.has_field("contact"));
    assert!(table.iter().all(|m| m.contact().is_none()));
    assert!(filter_any(&table, "contact", ["Mom"]).unwrap_err().is_unknown_field());
}

#[test]
fn test_all_store_formats_agree() {
    let archive = Archive::new();
    let csv = archive.table();

    for name in ["chat_df.json", "chat_df.jsonl"] {
        let other = load_path(archive.path(name), &archive.options()).unwrap();
        assert_eq!(other.len(), csv.len(), "{}", name);
        for (a, b) in csv.iter().zip(other.iter()) {
            assert_eq!(a.chat_id, b.chat_id, "{}", name);
            assert_eq!(a.text, b.text, "{}", name);
            assert_eq!(a.is_from_me, b.is_from_me, "{}", name);
            assert_eq!(a.date_utc, b.date_utc, "{}", name);
            assert_eq!(a.contact, b.contact, "{}", name);
            assert_eq!(a.field("service"), b.field("service"), "{}", name);
        }
    }
}

#[test]
fn test_forced_format_ignores_extension() {
    let archive = Archive::new();
    fs::write(archive.path("export.txt"), MESSAGES_CSV).unwrap();

    let options = archive.options().with_format(StoreFormat::Csv);
    let table = load_path(archive.path("export.txt"), &options).unwrap();
    assert_eq!(table.len(), 6);

    let err = load_path(archive.path("export.txt"), &archive.options()).unwrap_err();
    assert!(err.is_load());
}

#[test]
fn test_local_time_in_pacific() {
    let archive = Archive::new();
    let options = archive.options().with_timezone("US/Pacific");
    let table = load_path(archive.path("chat_df.csv"), &options).unwrap();

    // 2019-01-01 20:00 UTC is noon on a Tuesday in Pacific Standard Time
    let first = &table.messages()[0];
    assert_eq!(
        first.date_local,
        NaiveDate::from_ymd_opt(2019, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    );
    assert_eq!(first.hour, 12);
    assert_eq!(first.weekday, 1);
    assert_eq!(first.timestamp, "2019.01.01 12:00:00 PM");
}

#[test]
fn test_options_from_yaml_file() {
    let archive = Archive::new();
    let yaml = format!(
        "timezone: Europe/Berlin\nid_map: {}\nformat: jsonl\n",
        archive.path("id_map.yaml").display()
    );
    let options = LoadOptions::from_yaml_str(&yaml).unwrap();
    let table = load_path(archive.path("chat_df.jsonl"), &options).unwrap();

    assert_eq!(table.len(), 6);
    assert_eq!(table.messages()[0].hour, 21);
    assert_eq!(table.messages()[0].contact(), Some("Mom"));
}

// =============================================================================
// Error Distinctions
// =============================================================================

#[test]
fn test_missing_store_file() {
    let archive = Archive::new();
    let err = load_path(archive.path("nope.csv"), &archive.options()).unwrap_err();
    assert!(err.is_missing_file());
    assert!(err.is_load());
    assert!(err.to_string().contains("nope.csv"));
}

#[test]
fn test_missing_identity_map_file() {
    let archive = Archive::new();
    let options = LoadOptions::new().with_id_map(archive.path("missing.yaml"));
    let err = load_path(archive.path("chat_df.csv"), &options).unwrap_err();
    assert!(err.is_missing_file());
    assert!(err.is_config());
}

#[test]
fn test_missing_required_column() {
    let archive = Archive::new();
    fs::write(
        archive.path("no_chat.csv"),
        "guid,text,date_utc\na,hi,2019-01-01 00:00:00\n",
    )
    .unwrap();
    let err = load_path(archive.path("no_chat.csv"), &LoadOptions::new()).unwrap_err();
    assert!(err.is_load());
    assert!(!err.is_missing_file());
    assert!(err.to_string().contains("chat_id"));
}

#[test]
fn test_unparseable_date_cell() {
    let archive = Archive::new();
    fs::write(
        archive.path("bad_date.csv"),
        "chat_id,date_utc\n1,2019-01-01 00:00:00\n1,yesterday\n",
    )
    .unwrap();
    let err = load_path(archive.path("bad_date.csv"), &LoadOptions::new()).unwrap_err();
    assert!(err.is_load());
    assert!(err.to_string().contains("yesterday"));
}

#[test]
fn test_malformed_identity_map() {
    let archive = Archive::new();
    fs::write(archive.path("bad.yaml"), "1: [Mom\n").unwrap();
    let options = LoadOptions::new().with_id_map(archive.path("bad.yaml"));
    let err = load_path(archive.path("chat_df.csv"), &options).unwrap_err();
    assert!(err.is_config());
    assert!(!err.is_missing_file());
}

#[test]
fn test_unknown_timezone_fails_before_reading() {
    let options = LoadOptions::new().with_timezone("Mars/Olympus_Mons");
    let err = load_path("definitely/not/here.csv", &options).unwrap_err();
    assert!(err.is_config());
    assert!(!err.is_missing_file());
}

// =============================================================================
// Filters
// =============================================================================

#[test]
fn test_date_window_then_contact() {
    let archive = Archive::new();
    let table = archive.table();

    let winter = filter_between(&table, Some("Jan 1, 2019"), Some("Mar 1, 2019")).unwrap();
    assert_eq!(guids(&winter), vec!["a", "b", "c", "d"]);

    let family = filter_any(&winter, "contact", ["Mom", "Dad"]).unwrap();
    assert_eq!(guids(&family), vec!["a", "b", "c"]);

    let received = filter_by(&family, "is_from_me", |v| v.as_bool() == Some(false)).unwrap();
    assert_eq!(guids(&received), vec!["b"]);
}

#[test]
fn test_filter_on_extra_column() {
    let archive = Archive::new();
    let sms = filter_any(&archive.table(), "service", ["SMS"]).unwrap();
    assert_eq!(guids(&sms), vec!["c", "e", "f"]);
}

#[test]
fn test_open_ended_range() {
    let archive = Archive::new();
    let table = archive.table();
    let march = filter_between(&table, Some("2019-03-01"), None).unwrap();
    assert_eq!(guids(&march), vec!["e", "f"]);

    let err = filter_between(&table, Some("the ides of March"), None).unwrap_err();
    assert!(err.is_invalid_date());
}

// =============================================================================
// Charts
// =============================================================================

#[test]
fn test_monthly_counts_by_contact() {
    let archive = Archive::new();
    let series = count_over_time(&archive.table(), Frequency::MONTHLY, "contact").unwrap();

    assert_eq!(
        series.buckets,
        vec![
            NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2019, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2019, 3, 1).unwrap(),
        ]
    );
    assert_eq!(series.get("Mom").unwrap().values, vec![2, 0, 0]);
    assert_eq!(series.get("Dad").unwrap().values, vec![1, 0, 1]);
    assert_eq!(series.get("Book Club").unwrap().values, vec![0, 1, 0]);
    assert_eq!(series.get("other").unwrap().values, vec![0, 0, 1]);
    assert_eq!(series.total(), 6);
}

#[test]
fn test_monthly_length_by_contact() {
    let archive = Archive::new();
    let series = length_over_time(&archive.table(), Frequency::MONTHLY, "contact").unwrap();

    assert_eq!(series.get("Mom").unwrap().values, vec![20, 0, 0]);
    assert_eq!(series.get("Book Club").unwrap().values, vec![0, 0, 0]);
}

#[test]
fn test_breakdown_merges_small_contacts() {
    let archive = Archive::new();
    let charts = breakdown(&archive.table(), &[20.0, 10.0], "contact").unwrap();

    assert_eq!(charts[0].total, 6);
    assert_eq!(charts[0].title, "total: 6");
    let labels: Vec<&str> = charts[0].slices.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["Dad", "Mom", "other"]);
    assert_eq!(charts[0].get("other").unwrap().count, 2);

    assert_eq!(charts.len(), 2);
    assert_eq!(charts[1].total, 2);
    assert_eq!(charts[1].get("Book Club").unwrap().percent, 50.0);
}

#[test]
fn test_charts_written_as_json() {
    let archive = Archive::new();
    let table = archive.table();
    let out = archive.path("charts");
    let mut writer = JsonChartWriter::new(&out).unwrap();

    plot_count(&table, "W".parse().unwrap(), "contact", &PlotOptions::new(), &mut writer).unwrap();
    plot_breakdown(&table, &[20.0], "contact", &PieOptions::new(), &mut writer).unwrap();
    plot_weekly_heatmap(&table, &HeatmapOptions::new(), &mut writer).unwrap();

    let written = writer.written();
    assert_eq!(written.len(), 3);
    assert!(written.iter().all(|p| p.starts_with(&out) && p.exists()));

    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&written[2]).unwrap()).unwrap();
    assert_eq!(doc["kind"], "heatmap");
    assert_eq!(doc["data"]["counts"].as_array().unwrap().len(), 7);
}

#[test]
fn test_heatmap_counts_every_row() {
    let archive = Archive::new();
    let heatmap = weekly_heatmap(&archive.table());
    assert_eq!(heatmap.total(), 6);
    // 2019-01-01 was a Tuesday; two messages at 20:00 UTC
    assert_eq!(heatmap.get(1, 20), 2);
}

// =============================================================================
// Search
// =============================================================================

#[test]
fn test_search_case_handling() {
    let archive = Archive::new();
    let table = archive.table();

    assert_eq!(guids(&search(&table, "FRABJOUS", false).unwrap()), vec!["b", "e"]);
    assert_eq!(guids(&search(&table, "frabjous", true).unwrap()), vec!["b"]);
    assert!(search(&table, "jabberwock", false).unwrap().is_empty());
}

#[test]
fn test_context_search_output() {
    let archive = Archive::new();
    let table = archive.table();

    let mut out = Vec::new();
    let options = SearchOptions::new().with_radius(1);
    context_search(&table, "frabjous", &options, &mut out).unwrap();
    let out = String::from_utf8(out).unwrap();

    let blocks: Vec<&str> = out.split("\n\n").filter(|b| !b.is_empty()).collect();
    assert_eq!(blocks.len(), 2);
    assert!(blocks[0].starts_with("Mom\n"));
    assert!(blocks[0].contains("hey mom"));
    assert!(blocks[1].starts_with("Dad\n"));
    assert!(blocks[1].contains(&format!("{}Frabjous{}", HIGHLIGHT_START, HIGHLIGHT_END)));
}

#[test]
fn test_context_search_requires_contact() {
    let archive = Archive::new();
    let table = load_path(archive.path("chat_df.csv"), &LoadOptions::new()).unwrap();
    let mut out = Vec::new();
    let err = context_search(&table, "frabjous", &SearchOptions::new(), &mut out).unwrap_err();
    assert!(err.is_unknown_field());
    assert!(out.is_empty());
}

// =============================================================================
// Export
// =============================================================================

fn assert_reads_back(path: &Path, expected: &MessageTable) {
    let records = read_records(path).unwrap();
    assert_eq!(records.len(), expected.len());
    for (record, message) in records.iter().zip(expected.iter()) {
        assert_eq!(record.chat_id, message.chat_id);
        assert_eq!(record.text, message.text);
        assert_eq!(record.date_utc, message.date_utc);
        assert_eq!(record.is_from_me, message.is_from_me);
    }
}

#[test]
fn test_export_search_hits() {
    let archive = Archive::new();
    let hits = search(&archive.table(), "frabjous", false).unwrap();

    let csv_path = archive.path("hits.csv");
    let json_path = archive.path("hits.json");
    let jsonl_path = archive.path("hits.jsonl");
    write_csv(&hits, &csv_path).unwrap();
    write_json(&hits, &json_path).unwrap();
    write_jsonl(&hits, &jsonl_path).unwrap();

    for path in [&csv_path, &json_path, &jsonl_path] {
        assert_reads_back(path, &hits);
    }
}

#[test]
fn test_exported_table_reloads() {
    let archive = Archive::new();
    let table = archive.table();
    let path = archive.path("roundtrip.csv");
    write_csv(&table, &path).unwrap();

    let reloaded = load_path(&path, &archive.options()).unwrap();
    assert_eq!(reloaded.len(), table.len());
    assert_eq!(contacts(&reloaded), contacts(&table));
    assert_eq!(
        reloaded.messages()[5].date_utc,
        Utc.with_ymd_and_hms(2019, 3, 5, 12, 0, 0).unwrap()
    );
}
