use std::sync::Mutex;

use tempo_core::Reporter;

/// In-memory reporter for assertions on job outcomes.
#[derive(Default)]
pub(crate) struct RecordingReporter {
    records: Mutex<Vec<(String, bool)>>,
}

impl RecordingReporter {
    pub(crate) fn infos(&self) -> usize {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, is_error)| !is_error)
            .count()
    }

    pub(crate) fn errors(&self) -> usize {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, is_error)| *is_error)
            .count()
    }

    pub(crate) fn last_message(&self) -> Option<String> {
        self.records
            .lock()
            .unwrap()
            .last()
            .map(|(message, _)| message.clone())
    }
}

impl Reporter for RecordingReporter {
    fn info(&self, _job: &str, message: &str) {
        self.records
            .lock()
            .unwrap()
            .push((message.to_string(), false));
    }

    fn error(&self, _job: &str, message: &str) {
        self.records
            .lock()
            .unwrap()
            .push((message.to_string(), true));
    }
}
