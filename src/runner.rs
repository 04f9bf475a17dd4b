//! JSON-lines batch runner: one [`Event`] per input line, one
//! [`EventOutput`] per output line, preceded by a header line.

use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;
use thiserror::Error;

use crate::event::Event;
use crate::pipeline::{EventOutput, JetScratch, ProducerError, TopTagProducer, feature_version};

/// Events read before a parallel batch is dispatched, per worker.
const EVENTS_PER_WORKER: usize = 16;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Failed to read input line {line}: {source}")]
    Read {
        line: usize,
        source: std::io::Error,
    },
    #[error("Invalid event on line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },
    #[error("Event on line {line}: {source}")]
    Producer {
        line: usize,
        source: ProducerError,
    },
    #[error("Failed to write output: {0}")]
    Write(#[from] std::io::Error),
    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub events: usize,
    pub jets: usize,
}

#[derive(Debug, Serialize)]
struct Header<'a> {
    feature_version: &'a str,
    collection: &'a str,
    models: Vec<&'a str>,
}

/// Score every event read from `input` and write results to `output` in
/// input order.
pub fn run<R: BufRead, W: Write>(
    producer: &TopTagProducer,
    input: R,
    output: &mut W,
    workers: usize,
) -> Result<RunSummary, RunError> {
    let workers = workers.max(1);
    let header = Header {
        feature_version: feature_version(),
        collection: producer.src(),
        models: producer.registry().labels().collect(),
    };
    serde_json::to_writer(&mut *output, &header)?;
    output.write_all(b"\n")?;

    let mut summary = RunSummary::default();
    let batch_size = workers * EVENTS_PER_WORKER;
    let mut batch: Vec<(usize, Event)> = Vec::with_capacity(batch_size);
    for (idx, line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|source| RunError::Read {
            line: line_no,
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let event: Event = serde_json::from_str(&line).map_err(|source| RunError::Parse {
            line: line_no,
            source,
        })?;
        batch.push((line_no, event));
        if batch.len() >= batch_size {
            flush(producer, &mut batch, output, workers, &mut summary)?;
        }
    }
    flush(producer, &mut batch, output, workers, &mut summary)?;
    output.flush()?;
    tracing::info!(events = summary.events, jets = summary.jets, "run finished");
    Ok(summary)
}

fn flush<W: Write>(
    producer: &TopTagProducer,
    batch: &mut Vec<(usize, Event)>,
    output: &mut W,
    workers: usize,
    summary: &mut RunSummary,
) -> Result<(), RunError> {
    if batch.is_empty() {
        return Ok(());
    }
    let results = process_batch(producer, batch, workers);
    for ((line, event), result) in batch.iter().zip(results) {
        let out = result.map_err(|source| RunError::Producer {
            line: *line,
            source,
        })?;
        summary.events += 1;
        summary.jets += event.collection(producer.src()).map_or(0, <[_]>::len);
        serde_json::to_writer(&mut *output, &out)?;
        output.write_all(b"\n")?;
    }
    batch.clear();
    Ok(())
}

/// Process `batch` on up to `workers` threads. Results come back in batch
/// order.
fn process_batch(
    producer: &TopTagProducer,
    batch: &[(usize, Event)],
    workers: usize,
) -> Vec<Result<EventOutput, ProducerError>> {
    let workers = workers.clamp(1, batch.len().max(1));
    if workers == 1 {
        let mut scratch = JetScratch::new();
        return batch
            .iter()
            .map(|(_, event)| producer.produce(event, &mut scratch))
            .collect();
    }

    let next = AtomicUsize::new(0);
    let mut slots: Vec<Option<Result<EventOutput, ProducerError>>> =
        (0..batch.len()).map(|_| None).collect();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(|| {
                    let mut scratch = JetScratch::new();
                    let mut done = Vec::new();
                    loop {
                        let idx = next.fetch_add(1, Ordering::Relaxed);
                        let Some((_, event)) = batch.get(idx) else {
                            break;
                        };
                        done.push((idx, producer.produce(event, &mut scratch)));
                    }
                    done
                })
            })
            .collect();
        for handle in handles {
            match handle.join() {
                Ok(done) => {
                    for (idx, result) in done {
                        slots[idx] = Some(result);
                    }
                }
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
    });
    slots.into_iter().flatten().collect()
}
