use std::mem;

use crate::models::{
    FailedUpload, FailureReason, ReceiptId, UploadFile, UploadOutcome, UploadTicket,
    UploadedReceipt,
};

/// Where one file of a batch stands
#[derive(Debug, Clone, PartialEq)]
pub enum FileState {
    Pending,
    Initialized(UploadTicket),
    Transferred(UploadTicket),
    TransferFailed { ticket: UploadTicket, reason: String },
    Confirmed(UploadTicket),
    ConfirmFailed { ticket: UploadTicket, reason: String },
}

impl FileState {
    pub fn ticket(&self) -> Option<&UploadTicket> {
        match self {
            Self::Pending => None,
            Self::Initialized(t) | Self::Transferred(t) | Self::Confirmed(t) => Some(t),
            Self::TransferFailed { ticket, .. } | Self::ConfirmFailed { ticket, .. } => Some(ticket),
        }
    }
}

/// Per-invocation record of a batch, indexed by input position
#[derive(Debug)]
pub struct UploadBatch {
    files: Vec<UploadFile>,
    states: Vec<FileState>,
}

impl UploadBatch {
    pub fn new(files: Vec<UploadFile>) -> Self {
        let states = vec![FileState::Pending; files.len()];
        Self { files, states }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn files(&self) -> &[UploadFile] {
        &self.files
    }

    pub fn state(&self, index: usize) -> Option<&FileState> {
        self.states.get(index)
    }

    /// Attach one ticket per file, in input order. All or nothing.
    pub fn initialize(&mut self, tickets: Vec<UploadTicket>) -> Result<(), String> {
        if tickets.len() != self.files.len() {
            return Err(format!(
                "expected {} upload targets, got {}",
                self.files.len(),
                tickets.len()
            ));
        }
        self.states = tickets.into_iter().map(FileState::Initialized).collect();
        Ok(())
    }

    /// Files ready for transfer, with their index and destination
    pub fn pending_transfers(&self) -> Vec<(usize, &UploadFile, &UploadTicket)> {
        self.states
            .iter()
            .enumerate()
            .filter_map(|(i, state)| match state {
                FileState::Initialized(ticket) => Some((i, &self.files[i], ticket)),
                _ => None,
            })
            .collect()
    }

    pub fn record_transfer(&mut self, index: usize, result: Result<(), String>) {
        let Some(state) = self.states.get_mut(index) else {
            return;
        };
        *state = match mem::replace(state, FileState::Pending) {
            FileState::Initialized(ticket) => match result {
                Ok(()) => FileState::Transferred(ticket),
                Err(reason) => FileState::TransferFailed { ticket, reason },
            },
            other => other,
        };
    }

    /// Receipt ids of every successfully transferred file
    pub fn confirm_set(&self) -> Vec<ReceiptId> {
        self.states
            .iter()
            .filter_map(|state| match state {
                FileState::Transferred(ticket) => Some(ticket.receipt_id),
                _ => None,
            })
            .collect()
    }

    pub fn mark_confirmed(&mut self) {
        self.resolve_transferred(FileState::Confirmed);
    }

    /// Confirmation has no partial acknowledgment, so a failure demotes the
    /// whole confirm set
    pub fn mark_confirm_failed(&mut self, reason: &str) {
        self.resolve_transferred(|ticket| FileState::ConfirmFailed {
            ticket,
            reason: reason.to_string(),
        });
    }

    fn resolve_transferred(&mut self, next: impl Fn(UploadTicket) -> FileState) {
        for state in &mut self.states {
            *state = match mem::replace(state, FileState::Pending) {
                FileState::Transferred(ticket) => next(ticket),
                other => other,
            };
        }
    }

    pub fn into_outcome(self) -> UploadOutcome {
        let mut outcome = UploadOutcome::default();

        for (file, state) in self.files.into_iter().zip(self.states) {
            match state {
                FileState::Confirmed(ticket) => outcome.succeeded.push(UploadedReceipt {
                    receipt_id: ticket.receipt_id,
                    filename: file.filename,
                }),
                FileState::TransferFailed { ticket, reason } => outcome.failed.push(FailedUpload {
                    filename: file.filename,
                    receipt_id: Some(ticket.receipt_id),
                    reason: FailureReason::Transfer(reason),
                }),
                FileState::ConfirmFailed { ticket, reason } => outcome.failed.push(FailedUpload {
                    filename: file.filename,
                    receipt_id: Some(ticket.receipt_id),
                    reason: FailureReason::Confirm(reason),
                }),
                // unresolved states never reach here from a finished batch
                unresolved => outcome.failed.push(FailedUpload {
                    receipt_id: unresolved.ticket().map(|t| t.receipt_id),
                    filename: file.filename,
                    reason: FailureReason::Confirm("not confirmed".to_string()),
                }),
            }
        }

        outcome
    }
}
