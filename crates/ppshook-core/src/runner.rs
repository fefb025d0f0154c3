use std::io::BufRead;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::MessageSpec;
use crate::metadata::MetadataRecord;
use crate::publisher::Publisher;

/// One processing-completion event: exit status plus granule metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GranuleEvent {
    pub status: i32,
    #[serde(default)]
    pub metadata: MetadataRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct GranuleFailure {
    pub index: usize,
    pub filename: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub published: usize,
    pub suppressed: usize,
    pub failures: Vec<GranuleFailure>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.published + self.suppressed + self.failures.len()
    }
}

/// Reads JSON-lines events. Blank lines are skipped; a line that does not
/// parse is returned as an error so the caller can report it with its
/// line number.
pub fn read_events<R: BufRead>(
    reader: R,
) -> impl Iterator<Item = Result<GranuleEvent, String>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(line_index, line)| match line {
            Ok(line) if line.trim().is_empty() => None,
            Ok(line) => Some(
                serde_json::from_str::<GranuleEvent>(&line)
                    .map_err(|err| format!("line {}: {err}", line_index + 1)),
            ),
            Err(err) => Some(Err(format!("line {}: {err}", line_index + 1))),
        })
}

/// Publishes a message for every event. A granule that cannot be built or
/// published is logged and counted; it never stops the run.
pub fn process_events<I>(spec: &MessageSpec, events: I, publisher: &dyn Publisher) -> RunSummary
where
    I: IntoIterator<Item = Result<GranuleEvent, String>>,
{
    let mut summary = RunSummary::default();

    for (index, event) in events.into_iter().enumerate() {
        let event = match event {
            Ok(event) => event,
            Err(reason) => {
                warn!(index, %reason, "Skipping unreadable granule event");
                summary.failures.push(GranuleFailure {
                    index,
                    filename: None,
                    reason,
                });
                continue;
            }
        };

        match spec.post_hook(event.status, &event.metadata, publisher) {
            Ok(Some(_)) => summary.published += 1,
            Ok(None) => summary.suppressed += 1,
            Err(err) => {
                warn!(
                    index,
                    filename = event.metadata.filename.as_deref().unwrap_or_default(),
                    error = %err,
                    "Skipping granule"
                );
                summary.failures.push(GranuleFailure {
                    index,
                    filename: event.metadata.filename.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    info!(
        published = summary.published,
        suppressed = summary.suppressed,
        failed = summary.failures.len(),
        "Granule batch processed"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::{CallbackPublisher, PublishError};
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    fn spec() -> MessageSpec {
        MessageSpec::new(MetadataRecord {
            posttroll_topic: Some("PPSv2018".into()),
            station: Some("norrkoping".into()),
            output_format: Some("CF".into()),
            level: Some("2".into()),
            ..Default::default()
        })
    }

    #[test]
    fn bad_granules_do_not_stop_the_run() {
        let input = concat!(
            r#"{"status": 0, "metadata": {"filename": "/data/S_NWC_CMA_npp_1.nc", "sensor": "avhrr/3"}}"#,
            "\n",
            r#"{"status": 0, "metadata": {"sensor": "avhrr/3"}}"#,
            "\n",
            "\n",
            "not json\n",
            r#"{"status": 3, "metadata": {}}"#,
            "\n",
            r#"{"status": 0, "metadata": {"filename": "/data/S_NWC_CMA_npp_2.nc", "sensor": "viirs"}}"#,
            "\n",
        );
        let headers = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&headers);
        let publisher = CallbackPublisher::new(move |message, _status| {
            seen.lock()
                .map_err(|_| PublishError::DeliveryFailed("poisoned".into()))?
                .push(message.header.clone());
            Ok(())
        });

        let summary = process_events(&spec(), read_events(Cursor::new(input)), &publisher);

        assert_eq!(summary.published, 1);
        assert_eq!(summary.suppressed, 1);
        assert_eq!(summary.failures.len(), 3);
        assert_eq!(summary.total(), 5);
        assert!(summary.failures[0].reason.contains("'filename'"));
        assert!(summary.failures[1].reason.starts_with("line 4"));
        assert!(summary.failures[2].reason.contains("start_time"));
        assert_eq!(
            headers.lock().expect("headers").as_slice(),
            ["/CF/2/UNKNOWN/norrkoping/offline/polar/direct_readout/"]
        );
    }

    #[test]
    fn publisher_errors_are_recorded() {
        let publisher =
            CallbackPublisher::new(|_, _| Err(PublishError::DeliveryFailed("bus down".into())));
        let events = vec![Ok(GranuleEvent {
            status: 0,
            metadata: MetadataRecord {
                filename: Some("/tmp/xxx".into()),
                ..Default::default()
            },
        })];

        let summary = process_events(&spec(), events, &publisher);

        assert_eq!(summary.published, 0);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].filename.as_deref(), Some("/tmp/xxx"));
        assert!(summary.failures[0].reason.contains("bus down"));
    }
}
