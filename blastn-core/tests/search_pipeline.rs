use blastn_core::io::{into_sequence_map, FastaParser};
use blastn_core::extend::{GapRun, GapSide};
use blastn_core::search::NoopObserver;
use blastn_core::{SearchConfig, SearchError, Searcher};
use std::io::Write;
use tempfile::NamedTempFile;

/// Deterministic pseudo-random bases
fn random_bases(length: usize, seed: u64) -> String {
    let mut state = seed;
    (0..length)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            b"ACGT"[(state >> 62) as usize] as char
        })
        .collect()
}

fn write_fasta(records: &[(&str, &str)]) -> NamedTempFile {
    let mut f = NamedTempFile::new().expect("create temp fasta");
    for (name, seq) in records {
        writeln!(f, ">{} test record", name).unwrap();
        // Wrap at 60 columns like typical FASTA output
        for line in seq.as_bytes().chunks(60) {
            f.write_all(line).unwrap();
            writeln!(f).unwrap();
        }
    }
    f
}

#[test]
fn default_search_finds_planted_query_in_its_database_record() {
    let query = random_bases(120, 7);
    let flank_left = random_bases(300, 11);
    let flank_right = random_bases(250, 13);
    let carrier = format!("{}{}{}", flank_left, query, flank_right);
    let decoy = random_bases(600, 17);

    let query_file = write_fasta(&[("query1", &query)]);
    let db_file = write_fasta(&[("carrier", &carrier), ("decoy", &decoy)]);

    let queries = FastaParser::parse_file(query_file.path()).expect("parse query");
    let database = into_sequence_map(FastaParser::parse_file(db_file.path()).expect("parse db"))
        .expect("unique names");
    assert_eq!(queries.len(), 1);
    assert_eq!(database["carrier"].len(), 670);

    let searcher = Searcher::new(SearchConfig::default()).expect("valid config");
    let report = searcher
        .search(&queries[0], &database, &NoopObserver)
        .expect("search runs");

    assert_eq!(report.query_name, "query1");
    let carrier_hits = report
        .results
        .iter()
        .find(|hits| hits.name == "carrier")
        .expect("carrier searched");
    let best = carrier_hits.extensions.first().expect("planted copy found");

    assert_eq!(best.query_range, 0..120);
    assert_eq!(best.db_range, 300..420);
    assert_eq!(best.score, 240);
    assert_eq!(best.query_str(), query);
    assert_eq!(best.gap, None);

    let decoy_hits = report.results.iter().find(|hits| hits.name == "decoy");
    assert!(decoy_hits.map_or(true, |hits| hits.extensions.is_empty()));
}

#[test]
fn indel_in_database_copy_is_bridged_with_query_gaps() {
    let query = random_bases(80, 23);
    let mut copy = query[..40].to_string();
    copy.push_str("TT");
    copy.push_str(&query[40..]);
    let carrier = format!("{}{}{}", random_bases(50, 29), copy, random_bases(50, 31));

    let searcher = Searcher::new(SearchConfig {
        diagonal_tolerance: 2,
        ..Default::default()
    })
    .unwrap();

    let database = into_sequence_map(
        FastaParser::parse_str(&format!(">carrier\n{}\n", carrier)).unwrap(),
    )
    .unwrap();
    let query = blastn_core::Sequence::from_text("q", &query);
    let report = searcher.search(&query, &database, &NoopObserver).unwrap();

    let min_score = searcher.config().min_score;
    let extensions = &report.results[0].extensions;
    let gapped: Vec<_> = extensions.iter().filter(|e| e.gap_count() == 2).collect();
    assert!(!gapped.is_empty(), "anchors across the insertion should be bridged");
    for extension in gapped {
        assert!(extension.score >= min_score);
        assert_eq!(extension.query_aligned.len(), extension.db_aligned.len());
        assert_eq!(extension.gap.map(|g| g.side), Some(GapSide::Query));
    }

    // The best alignment places the gaps exactly at the insertion
    let best = &extensions[0];
    assert_eq!(best.query_range, 0..80);
    assert_eq!(best.db_range, 50..132);
    assert_eq!(best.gap, Some(GapRun { side: GapSide::Query, offset: 40, length: 2 }));
    assert_eq!(best.score, 158);
}

#[test]
fn short_query_is_rejected() {
    let searcher = Searcher::new(SearchConfig::default()).unwrap();
    let query = blastn_core::Sequence::from_text("tiny", "ACGT");
    let database = into_sequence_map(FastaParser::parse_str(">d\nACGTACGTACGTACGT\n").unwrap()).unwrap();

    let err = searcher.search(&query, &database, &NoopObserver).unwrap_err();
    assert!(matches!(err, SearchError::QueryTooShort { .. }));
    assert!(err.to_string().contains("tiny"));
}

#[test]
fn config_roundtrips_through_partial_serde() {
    let config: SearchConfig = serde_json::from_str(r#"{"word_length": 7, "min_score": 12}"#)
        .expect("partial config fills defaults");
    assert_eq!(config.word_length, 7);
    assert_eq!(config.min_score, 12);
    assert_eq!(config.match_score, SearchConfig::default().match_score);
}
