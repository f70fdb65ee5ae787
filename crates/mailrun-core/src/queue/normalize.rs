//! Task normalization: raw record -> queued task.

use tracing::{error, warn};

use crate::domain::{
    LookupError, MailrunError, NormalizedTask, QueuedTask, RecipientEntry, TaskBody, TaskRecord,
};
use crate::ports::ProfileStore;

/// A normalized task plus the recipients that had to be dropped.
#[derive(Debug)]
pub struct Normalization {
    pub task: QueuedTask,
    pub skipped: Vec<MailrunError>,
}

/// Split a comma-separated address list.
///
/// Whitespace is trimmed, empty entries dropped, duplicates collapsed
/// (first occurrence wins, order kept).
pub fn split_recipients(to: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for address in to.split(',').map(str::trim).filter(|a| !a.is_empty()) {
        if !out.iter().any(|seen| seen == address) {
            out.push(address.to_string());
        }
    }
    out
}

/// Normalize one raw record.
///
/// Only `mailer` records are interpreted; any other service is kept as
/// `TaskBody::Unprocessed`. Fails only when the `mailer` fields themselves are
/// unusable; a recipient without profile data is skipped and reported in
/// `Normalization::skipped`.
pub fn normalize(
    file_id: &str,
    record: TaskRecord,
    profiles: &dyn ProfileStore,
) -> Result<Normalization, MailrunError> {
    if !record.service.is_mailer() {
        warn!(task = file_id, service = %record.service, "service is not processed; task kept as-is");
        return Ok(Normalization {
            task: QueuedTask {
                service: record.service.clone(),
                body: TaskBody::Unprocessed(record),
            },
            skipped: Vec::new(),
        });
    }

    let fields = record
        .mailer_fields()
        .map_err(|e| MailrunError::source_read(file_id, e))?;

    let mut recipients = Vec::new();
    let mut skipped = Vec::new();
    for address in split_recipients(&fields.to) {
        match profiles.lookup(&address) {
            Ok(replaces) => recipients.push(RecipientEntry {
                address,
                subject: fields.subject.clone(),
                replaces,
            }),
            Err(err) => {
                let err = match err {
                    LookupError::NotFound(_) => MailrunError::MissingRecipientData(address.clone()),
                    other => MailrunError::from(other),
                };
                error!(task = file_id, recipient = %address, error = %err, "recipient skipped");
                skipped.push(err);
            }
        }
    }

    let service = record.service;
    Ok(Normalization {
        task: QueuedTask {
            service: service.clone(),
            body: TaskBody::Mailer(NormalizedTask::new(service, fields, recipients)),
        },
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;
    use crate::impls::InMemoryProfileStore;
    use rstest::rstest;

    fn record(json: &str) -> TaskRecord {
        TaskRecord::from_json(json).unwrap()
    }

    #[rstest]
    #[case::spaces("b@y, c@y", vec!["b@y", "c@y"])]
    #[case::no_spaces("b@y,c@y", vec!["b@y", "c@y"])]
    #[case::trailing_comma("b@y, ", vec!["b@y"])]
    #[case::duplicates("b@y, c@y, b@y", vec!["b@y", "c@y"])]
    #[case::empty("", vec![])]
    fn splits_recipient_lists(#[case] to: &str, #[case] expected: Vec<&str>) {
        assert_eq!(split_recipients(to), expected);
    }

    #[test]
    fn mailer_task_pairs_recipients_with_profiles() {
        let profiles = InMemoryProfileStore::new()
            .with("b@y", &[("Name", "Bob")])
            .with("c@y", &[("Name", "Carol")]);
        let rec = record(
            r#"{"service":"mailer","from":"a@x","to":"b@y, c@y","subject":"Hi [Name]","template":"greet","replaces":{"Sign":"Team"}}"#,
        );

        let n = normalize("t.json", rec, &profiles).unwrap();
        assert!(n.skipped.is_empty());

        let TaskBody::Mailer(task) = n.task.body else {
            panic!("expected a mailer task");
        };
        assert_eq!(task.from(), "a@x");
        assert_eq!(task.template(), "greet");
        assert_eq!(task.replaces()["Sign"], "Team");
        let addresses: Vec<&str> = task.recipients().iter().map(|r| r.address.as_str()).collect();
        assert_eq!(addresses, vec!["b@y", "c@y"]);
        assert_eq!(task.recipients()[1].subject, "Hi [Name]");
        assert_eq!(task.recipients()[1].replaces["Name"], "Carol");
    }

    #[test]
    fn recipient_without_profile_is_skipped() {
        let profiles = InMemoryProfileStore::new().with("b@y", &[("Name", "Bob")]);
        let rec = record(
            r#"{"service":"mailer","from":"a@x","to":"b@y, ghost@y","subject":"s","template":"t"}"#,
        );

        let n = normalize("t.json", rec, &profiles).unwrap();
        assert_eq!(n.skipped.len(), 1);
        assert_eq!(n.skipped[0].kind(), ErrorKind::DataMissing);
        assert!(n.skipped[0].to_string().contains("ghost@y"));

        let TaskBody::Mailer(task) = n.task.body else {
            panic!("expected a mailer task");
        };
        assert_eq!(task.recipients().len(), 1);
    }

    #[test]
    fn other_services_are_kept_unprocessed() {
        let rec = record(r#"{"service":"sms","phone":"+100"}"#);
        let n = normalize("s.json", rec.clone(), &InMemoryProfileStore::new()).unwrap();
        assert_eq!(n.task.service.as_str(), "sms");
        assert_eq!(n.task.body, TaskBody::Unprocessed(rec));
    }

    #[test]
    fn broken_mailer_fields_are_a_source_error() {
        let rec = record(r#"{"service":"mailer","from":"a@x"}"#);
        let err = normalize("t.json", rec, &InMemoryProfileStore::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceRead);
        assert!(err.to_string().contains("t.json"));
    }
}
