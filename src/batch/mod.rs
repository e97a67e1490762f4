//! Bulk scoring of a record store against an optional reference table.

pub mod checkpoint;
pub mod reference;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::buffered_eprintln;
use crate::config::BatchConfig;
use crate::similarity::{parse_numeric, EarthSimilarity, Field, InputVector};
use reference::{id_string, ReferenceTable};

/// Example ids kept for warnings and the summary.
const MAX_EXAMPLES: usize = 10;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub records_path: PathBuf,
    pub reference_path: Option<PathBuf>,
    pub output_path: PathBuf,
    /// Merge an existing `<output>.tmp` checkpoint before scoring
    pub resume: bool,
    /// Draw the progress line on stderr
    pub show_progress: bool,
    pub verbose: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub total: usize,
    pub scored: usize,
    pub skipped_existing: usize,
    pub ineligible: usize,
    pub missing_id: usize,
    pub missing_reference: usize,
    pub missing_reference_examples: Vec<String>,
    pub failed: usize,
    /// Records read back from a checkpoint
    pub resumed: usize,
    pub checkpoints_written: usize,
    pub elapsed: Duration,
}

/// What a batch run does with one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    AlreadyScored,
    Ineligible,
    MissingId,
    Score(String),
}

pub fn classify(record: &Map<String, Value>, config: &BatchConfig) -> Disposition {
    if record
        .get(&config.score_column)
        .is_some_and(|v| !v.is_null())
    {
        return Disposition::AlreadyScored;
    }

    let label = record
        .get(&config.label_column)
        .and_then(Value::as_str)
        .unwrap_or("");
    if !config.eligibility.admits(label) {
        return Disposition::Ineligible;
    }

    let id = id_string(record.get(&config.id_column));
    if id.is_empty() {
        return Disposition::MissingId;
    }
    Disposition::Score(id)
}

/// Gather the inputs for one record.
///
/// Each field comes from the record's own column first, then the record's row
/// in the reference table, and is left unset otherwise so the scorer applies
/// its default.
pub fn assemble_input(
    record: &Map<String, Value>,
    reference: Option<(&ReferenceTable, &str)>,
    config: &BatchConfig,
) -> InputVector {
    let mut input = InputVector::new();
    for field in Field::ALL {
        let own = config
            .record_columns
            .get(field)
            .and_then(|column| record.get(column))
            .and_then(|value| parse_numeric(value).ok().flatten());
        let value = own.or_else(|| {
            let (table, id) = reference?;
            table.value(id, config.reference_columns.get(field)?)
        });
        input.set(field, value);
    }
    input
}

fn set_score(record: &mut Value, column: &str, score: Value) {
    if let Some(object) = record.as_object_mut() {
        object.insert(column.to_string(), score);
    }
}

/// Throttled single-line progress report.
struct Progress {
    enabled: bool,
    started: Instant,
    last: Option<Instant>,
    interval: Duration,
    total: usize,
}

impl Progress {
    fn new(enabled: bool, interval: Duration, total: usize) -> Self {
        Self {
            enabled,
            started: Instant::now(),
            last: None,
            interval,
            total,
        }
    }

    fn tick(&mut self, done: usize) {
        if !self.enabled {
            return;
        }
        let now = Instant::now();
        if self
            .last
            .is_some_and(|last| now.duration_since(last) < self.interval)
            && done < self.total
        {
            return;
        }
        self.last = Some(now);

        let elapsed = now.duration_since(self.started).as_secs_f64();
        let rate = if elapsed > 0.0 { done as f64 / elapsed } else { 0.0 };
        let eta = if rate > 0.0 {
            let remaining = self.total.saturating_sub(done) as f64 / rate;
            humantime::format_duration(Duration::from_secs(remaining.ceil() as u64)).to_string()
        } else {
            "unknown".to_string()
        };
        eprint!(
            "\r  Scored {}/{} ({:.0}/s, ETA {})   ",
            done, self.total, rate, eta
        );
    }

    fn finish(&self) {
        if self.enabled && self.last.is_some() {
            eprintln!();
        }
    }
}

/// Score every pending record and write the result to `options.output_path`.
///
/// Failures on individual records store `null` and are reported as
/// warnings; only I/O problems abort the run.
pub fn run_batch(
    scorer: &EarthSimilarity,
    config: &BatchConfig,
    options: &BatchOptions,
) -> Result<BatchSummary> {
    let started = Instant::now();
    let interval = humantime::parse_duration(config.progress_interval.trim())
        .with_context(|| format!("Invalid progress interval '{}'", config.progress_interval))?;

    let mut records = checkpoint::load_records(&options.records_path)?;
    if let Some(index) = records.iter().position(|r| !r.is_object()) {
        anyhow::bail!(
            "Record {} in {} is not an object",
            index,
            options.records_path.display()
        );
    }

    let reference = match &options.reference_path {
        Some(path) => Some(load_reference(path, config, options.verbose)?),
        None => None,
    };

    let mut summary = BatchSummary {
        total: records.len(),
        ..BatchSummary::default()
    };

    let checkpoint_file = checkpoint::checkpoint_path(&options.output_path);
    if options.resume {
        match checkpoint::load_checkpoint(&checkpoint_file) {
            Ok(Some(partial)) => {
                summary.resumed = partial.len();
                eprintln!(
                    "Resuming from {} ({} records)",
                    checkpoint_file.display(),
                    partial.len()
                );
                records = checkpoint::merge_checkpoint(records, partial, &config.id_column);
            }
            Ok(None) => {}
            Err(e) => {
                buffered_eprintln!("[WARN] Ignoring unreadable checkpoint, starting fresh: {:#}", e);
            }
        }
    }

    let mut pending: Vec<(usize, String)> = Vec::new();
    for (index, record) in records.iter_mut().enumerate() {
        let disposition = match record.as_object() {
            Some(object) => classify(object, config),
            None => continue,
        };
        match disposition {
            Disposition::AlreadyScored => summary.skipped_existing += 1,
            Disposition::Ineligible => {
                set_score(record, &config.score_column, Value::Null);
                summary.ineligible += 1;
            }
            Disposition::MissingId => {
                set_score(record, &config.score_column, Value::Null);
                summary.missing_id += 1;
            }
            Disposition::Score(id) => pending.push((index, id)),
        }
    }

    if options.verbose {
        eprintln!(
            "{} records: {} to score, {} already scored, {} ineligible, {} without id",
            summary.total,
            pending.len(),
            summary.skipped_existing,
            summary.ineligible,
            summary.missing_id
        );
    }

    if options.show_progress {
        crate::stderr_buffer::activate();
    }
    let mut progress = Progress::new(options.show_progress, interval, pending.len());

    let chunk_size = config.checkpoint_every.max(1);
    let mut done = 0;
    for chunk in pending.chunks(chunk_size) {
        let inputs: Vec<(usize, &str, InputVector)> = chunk
            .iter()
            .map(|(index, id)| {
                if reference.as_ref().is_some_and(|table| table.row(id).is_none()) {
                    summary.missing_reference += 1;
                    if summary.missing_reference_examples.len() < MAX_EXAMPLES {
                        summary.missing_reference_examples.push(id.clone());
                    }
                }
                let empty = Map::new();
                let record = records[*index].as_object().unwrap_or(&empty);
                let source = reference.as_ref().map(|table| (table, id.as_str()));
                (*index, id.as_str(), assemble_input(record, source, config))
            })
            .collect();

        let results: Vec<_> = inputs
            .par_iter()
            .map(|(index, id, input)| (*index, *id, scorer.assess(input)))
            .collect();

        for (index, id, result) in results {
            let score = match result {
                Ok(assessment) => {
                    summary.scored += 1;
                    Value::from(assessment.score_rounded(config.round_decimals))
                }
                Err(e) => {
                    summary.failed += 1;
                    buffered_eprintln!("[WARN] No score for {}: {}", id, e);
                    Value::Null
                }
            };
            set_score(&mut records[index], &config.score_column, score);
        }

        done += chunk.len();
        progress.tick(done);

        if done < pending.len() {
            if let Err(e) = checkpoint::save_records(&checkpoint_file, &records) {
                progress.finish();
                if options.show_progress {
                    crate::stderr_buffer::flush();
                }
                return Err(e);
            }
            summary.checkpoints_written += 1;
        }
    }

    progress.finish();
    if options.show_progress {
        crate::stderr_buffer::flush();
    }

    checkpoint::save_records(&options.output_path, &records)?;
    checkpoint::remove_checkpoint(&checkpoint_file)?;

    summary.elapsed = started.elapsed();
    Ok(summary)
}

fn load_reference(path: &std::path::Path, config: &BatchConfig, verbose: bool) -> Result<ReferenceTable> {
    let mut table = ReferenceTable::load(path, &config.id_column)?;

    if !table.duplicate_ids().is_empty() {
        let examples: Vec<&str> = table
            .duplicate_ids()
            .iter()
            .take(MAX_EXAMPLES)
            .map(String::as_str)
            .collect();
        buffered_eprintln!(
            "[WARN] {} duplicate reference rows ignored (first row kept), e.g. {}",
            table.duplicate_rows(),
            examples.join(", ")
        );
    }

    if config.impute_medians {
        let columns: Vec<&str> = config
            .reference_columns
            .columns()
            .into_iter()
            .map(|(_, column)| column)
            .collect();
        let filled = table.impute_medians(&columns);
        if verbose {
            eprintln!("Imputed {} missing reference cells with column medians", filled);
        }
    }

    if verbose {
        eprintln!("Loaded {} reference rows from {}", table.len(), path.display());
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Eligibility;
    use crate::similarity::InputDefaults;
    use serde_json::json;
    use std::env;
    use std::fs;
    use std::path::Path;

    fn scorer() -> EarthSimilarity {
        EarthSimilarity::new(InputDefaults::default()).unwrap()
    }

    fn write_json(path: &Path, value: &Value) {
        fs::write(path, serde_json::to_string(value).unwrap()).unwrap();
    }

    fn read_json(path: &Path) -> Vec<Value> {
        checkpoint::load_records(path).unwrap()
    }

    /// Temp file set unique to one test.
    fn paths(name: &str) -> (PathBuf, PathBuf, PathBuf) {
        let dir = env::temp_dir();
        let records = dir.join(format!("terra_score_test_{}_records.json", name));
        let reference = dir.join(format!("terra_score_test_{}_reference.json", name));
        let output = dir.join(format!("terra_score_test_{}_output.json", name));
        let _ = fs::remove_file(checkpoint::checkpoint_path(&output));
        (records, reference, output)
    }

    fn cleanup(paths: &[&Path]) {
        for path in paths {
            let _ = fs::remove_file(path);
        }
    }

    fn options(records: &Path, reference: Option<&Path>, output: &Path, resume: bool) -> BatchOptions {
        BatchOptions {
            records_path: records.to_path_buf(),
            reference_path: reference.map(Path::to_path_buf),
            output_path: output.to_path_buf(),
            resume,
            show_progress: false,
            verbose: false,
        }
    }

    fn sample_records() -> Value {
        json!([
            { "object_id": "A", "label": "CONFIRMED", "pl_radio": 1.0,
              "pl_temperatura_eq": 290, "periodo_orbital": 100 },
            { "object_id": "B", "label": "FALSE POSITIVE", "pl_radio": 1.0 },
            { "object_id": "C", "label": "CANDIDATE", "earth_similarity": 42.0 },
            { "label": "CONFIRMED", "pl_radio": 1.0 },
            { "object_id": "E", "label": "candidate" }
        ])
    }

    fn sample_reference() -> Value {
        json!([
            { "object_id": "A", "insolacion": 1.0, "st_temperatura": 5777,
              "st_radio": 1.0, "st_gravedad": 4.4 }
        ])
    }

    #[test]
    fn test_classify() {
        let config = BatchConfig::default();
        let classify_json = |v: Value| classify(v.as_object().unwrap(), &config);

        assert_eq!(
            classify_json(json!({ "object_id": "A", "label": "CONFIRMED" })),
            Disposition::Score("A".to_string())
        );
        assert_eq!(
            classify_json(json!({ "object_id": "A", "label": "CONFIRMED", "earth_similarity": 0.0 })),
            Disposition::AlreadyScored
        );
        assert_eq!(
            classify_json(json!({ "object_id": "A", "label": "CONFIRMED", "earth_similarity": null })),
            Disposition::Score("A".to_string())
        );
        assert_eq!(
            classify_json(json!({ "object_id": "A", "label": "FALSE POSITIVE" })),
            Disposition::Ineligible
        );
        assert_eq!(
            classify_json(json!({ "object_id": "", "label": "CANDIDATE" })),
            Disposition::MissingId
        );
    }

    #[test]
    fn test_classify_deny_policy() {
        let config = BatchConfig {
            eligibility: Eligibility::Deny(vec!["FALSE POSITIVE".to_string()]),
            ..BatchConfig::default()
        };
        let record = json!({ "object_id": 7, "label": "REFUTED" });
        assert_eq!(
            classify(record.as_object().unwrap(), &config),
            Disposition::Score("7".to_string())
        );
    }

    #[test]
    fn test_lookup_precedence() {
        let config = BatchConfig::default();
        let record = json!({ "pl_radio": 2.0, "periodo_orbital": "n/a", "insolacion": 9.0 });
        let row = json!({ "object_id": "K1", "pl_radio": 1.0, "insolacion": "1.5", "periodo_orbital": 30 });
        let table = ReferenceTable::from_rows(vec![row], "object_id");

        let input = assemble_input(record.as_object().unwrap(), Some((&table, "K1")), &config);
        // Record column wins
        assert_eq!(input.get(Field::Radius), Some(2.0));
        // Insolation is not a record column, so the reference value is used
        assert_eq!(input.get(Field::Insol), Some(1.5));
        // Unparseable record value falls through to the reference
        assert_eq!(input.get(Field::Period), Some(30.0));
        // Absent everywhere: left to the default
        assert_eq!(input.get(Field::StLogg), None);

        // An id without a reference row only uses the record
        let input = assemble_input(record.as_object().unwrap(), Some((&table, "K9")), &config);
        assert_eq!(input.get(Field::Insol), None);
        assert_eq!(input.get(Field::Radius), Some(2.0));
    }

    #[test]
    fn test_run_batch_scores_eligible_records() {
        let (records, reference, output) = paths("eligible");
        write_json(&records, &sample_records());
        write_json(&reference, &sample_reference());

        let summary = run_batch(
            &scorer(),
            &BatchConfig::default(),
            &options(&records, Some(&reference), &output, false),
        )
        .unwrap();

        assert_eq!(summary.total, 5);
        assert_eq!(summary.scored, 2);
        assert_eq!(summary.skipped_existing, 1);
        assert_eq!(summary.ineligible, 1);
        assert_eq!(summary.missing_id, 1);
        assert_eq!(summary.missing_reference, 1);
        assert_eq!(summary.missing_reference_examples, vec!["E".to_string()]);
        assert_eq!(summary.failed, 0);

        let scored = read_json(&output);
        assert_eq!(scored.len(), 5);
        let a = scored[0]["earth_similarity"].as_f64().unwrap();
        assert!(a > 75.0 && a < 80.0, "score {}", a);
        assert_eq!((a * 10.0).round() / 10.0, a);
        assert_eq!(scored[1]["earth_similarity"], Value::Null);
        assert_eq!(scored[2]["earth_similarity"], json!(42.0));
        assert_eq!(scored[3]["earth_similarity"], Value::Null);
        assert!(scored[4]["earth_similarity"].is_number());
        // Input fields are kept
        assert_eq!(scored[1]["label"], json!("FALSE POSITIVE"));

        assert!(!checkpoint::checkpoint_path(&output).exists());
        cleanup(&[&records, &reference, &output]);
    }

    #[test]
    fn test_run_batch_writes_checkpoints() {
        let (records, _, output) = paths("checkpoints");
        write_json(
            &records,
            &json!([
                { "object_id": "1", "label": "CONFIRMED" },
                { "object_id": "2", "label": "CONFIRMED" },
                { "object_id": "3", "label": "CONFIRMED" }
            ]),
        );
        let config = BatchConfig {
            checkpoint_every: 1,
            ..BatchConfig::default()
        };

        let summary = run_batch(&scorer(), &config, &options(&records, None, &output, true)).unwrap();
        assert_eq!(summary.scored, 3);
        assert_eq!(summary.checkpoints_written, 2);
        assert_eq!(summary.missing_reference, 0);
        assert!(!checkpoint::checkpoint_path(&output).exists());
        cleanup(&[&records, &output]);
    }

    #[test]
    fn test_resume_keeps_checkpointed_scores() {
        let (records, _, output) = paths("resume");
        write_json(
            &records,
            &json!([
                { "object_id": "A", "label": "CONFIRMED" },
                { "object_id": "B", "label": "CONFIRMED" }
            ]),
        );
        write_json(
            &checkpoint::checkpoint_path(&output),
            &json!([{ "object_id": "A", "label": "CONFIRMED", "earth_similarity": 99.9 }]),
        );

        let summary = run_batch(
            &scorer(),
            &BatchConfig::default(),
            &options(&records, None, &output, true),
        )
        .unwrap();
        assert_eq!(summary.resumed, 1);
        assert_eq!(summary.skipped_existing, 1);
        assert_eq!(summary.scored, 1);

        let scored = read_json(&output);
        assert_eq!(scored[0]["earth_similarity"], json!(99.9));
        assert!(scored[1]["earth_similarity"].is_number());
        assert!(!checkpoint::checkpoint_path(&output).exists());
        cleanup(&[&records, &output]);
    }

    #[test]
    fn test_no_resume_ignores_checkpoint() {
        let (records, _, output) = paths("no_resume");
        write_json(&records, &json!([{ "object_id": "A", "label": "CONFIRMED" }]));
        write_json(
            &checkpoint::checkpoint_path(&output),
            &json!([{ "object_id": "A", "earth_similarity": 99.9 }]),
        );

        let summary = run_batch(
            &scorer(),
            &BatchConfig::default(),
            &options(&records, None, &output, false),
        )
        .unwrap();
        assert_eq!(summary.resumed, 0);
        assert_eq!(summary.scored, 1);
        assert_ne!(read_json(&output)[0]["earth_similarity"], json!(99.9));
        cleanup(&[&records, &output]);
    }

    #[test]
    fn test_corrupt_checkpoint_starts_fresh() {
        let (records, _, output) = paths("corrupt");
        write_json(&records, &json!([{ "object_id": "A", "label": "CONFIRMED" }]));
        fs::write(checkpoint::checkpoint_path(&output), "[{").unwrap();

        let summary = run_batch(
            &scorer(),
            &BatchConfig::default(),
            &options(&records, None, &output, true),
        )
        .unwrap();
        assert_eq!(summary.resumed, 0);
        assert_eq!(summary.scored, 1);
        assert!(!checkpoint::checkpoint_path(&output).exists());
        cleanup(&[&records, &output]);
    }

    #[test]
    fn test_non_object_record_is_error() {
        let (records, _, output) = paths("non_object");
        write_json(&records, &json!([{ "object_id": "A" }, 3]));

        let err = run_batch(
            &scorer(),
            &BatchConfig::default(),
            &options(&records, None, &output, false),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Record 1"));
        assert!(!output.exists());
        cleanup(&[&records]);
    }

    #[test]
    fn test_missing_records_file_is_error() {
        let (records, _, output) = paths("missing_records");
        let _ = fs::remove_file(&records);
        assert!(run_batch(
            &scorer(),
            &BatchConfig::default(),
            &options(&records, None, &output, false),
        )
        .is_err());
    }
}
