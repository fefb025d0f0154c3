use crate::error::{HookError, Result};
use crate::metadata::{MetadataRecord, MANDATORY_FIELDS};
use crate::status::Status;

/// A validation step run when a `MessageBuilder` is constructed.
pub trait MetadataCheck: Send + Sync {
    fn name(&self) -> &'static str;
    fn check(&self, status: Status, metadata: &MetadataRecord) -> Result<()>;
}

/// Requires `level`, `output_format` and `station`, in that order.
#[derive(Debug, Clone, Copy, Default)]
pub struct MandatoryParameters;

impl MetadataCheck for MandatoryParameters {
    fn name(&self) -> &'static str {
        "mandatory_parameters"
    }

    fn check(&self, _status: Status, metadata: &MetadataRecord) -> Result<()> {
        check_metadata_contains_mandatory_parameters(metadata)
    }
}

/// Requires a `filename` whenever the run succeeded.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilenamePresent;

impl MetadataCheck for FilenamePresent {
    fn name(&self) -> &'static str {
        "filename_present"
    }

    fn check(&self, status: Status, metadata: &MetadataRecord) -> Result<()> {
        check_metadata_contains_filename(status, metadata)
    }
}

pub fn check_metadata_contains_mandatory_parameters(metadata: &MetadataRecord) -> Result<()> {
    for (key, _) in MANDATORY_FIELDS {
        if metadata.mandatory_value(key).is_none() {
            return Err(HookError::MissingMandatoryField(key));
        }
    }
    Ok(())
}

pub fn check_metadata_contains_filename(status: Status, metadata: &MetadataRecord) -> Result<()> {
    if status.is_success() && metadata.filename.is_none() {
        return Err(HookError::MissingFilename);
    }
    Ok(())
}

pub fn default_checks() -> [&'static dyn MetadataCheck; 2] {
    [&MandatoryParameters, &FilenamePresent]
}

pub fn run_checks(
    checks: &[&dyn MetadataCheck],
    status: Status,
    metadata: &MetadataRecord,
) -> Result<()> {
    for check in checks {
        check.check(status, metadata)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> MetadataRecord {
        MetadataRecord {
            posttroll_topic: Some("PPSv2018".into()),
            station: Some("norrkoping".into()),
            output_format: Some("CF".into()),
            level: Some("2".into()),
            variant: Some("DR".into()),
            ..Default::default()
        }
    }

    #[test]
    fn reports_first_missing_field_in_fixed_order() {
        let mut metadata = configured();
        metadata.level = None;
        metadata.station = None;
        let err = MandatoryParameters
            .check(Status::Success, &metadata)
            .expect_err("level is missing");
        assert_eq!(err.to_string(), "pps_hook must contain metadata attribute level");

        let mut metadata = configured();
        metadata.output_format = None;
        metadata.station = None;
        let err = MandatoryParameters
            .check(Status::Success, &metadata)
            .expect_err("output_format is missing");
        assert!(matches!(err, HookError::MissingMandatoryField("output_format")));

        let mut metadata = configured();
        metadata.station = None;
        let err = MandatoryParameters
            .check(Status::Success, &metadata)
            .expect_err("station is missing");
        assert!(matches!(err, HookError::MissingMandatoryField("station")));
    }

    #[test]
    fn filename_only_required_on_success() {
        let metadata = configured();
        let err = FilenamePresent
            .check(Status::Success, &metadata)
            .expect_err("filename missing");
        assert!(matches!(err, HookError::MissingFilename));
        assert!(err.to_string().contains("'filename'"));

        FilenamePresent
            .check(Status::Failed(1), &metadata)
            .expect("failure status skips the filename check");
    }

    #[test]
    fn run_checks_stops_at_first_failure() {
        let metadata = MetadataRecord::default();
        let err = run_checks(&default_checks(), Status::Success, &metadata)
            .expect_err("nothing configured");
        assert!(matches!(err, HookError::MissingMandatoryField("level")));

        run_checks(&[], Status::Success, &metadata).expect("no checks, no errors");
    }
}
