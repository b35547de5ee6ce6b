//! Command dispatch: one textual system command in, one calendar result out.
//!
//! Ties the parser, the typed [`Operation`] and the calendar collaborator
//! together. Every failure comes back as a classified [`DispatchError`];
//! nothing here panics or leaks a raw collaborator fault.

use crate::calendar::{CalendarResult, CalendarService, DeleteStatus};
use crate::command::Operation;
use crate::error::DispatchError;

/// Parse, validate and execute a system command against the calendar
/// collaborator.
///
/// Parsing or validation failures return before any collaborator call, so a
/// malformed command never causes a remote side effect. `delete_event` of a
/// missing id is not an error: it yields a `failed` status record so the
/// conversation loop can report it conversationally.
pub async fn dispatch(
    command: &str,
    calendar: &dyn CalendarService,
) -> Result<CalendarResult, DispatchError> {
    let operation = Operation::parse(command)?;
    tracing::debug!(operation = operation.name(), "dispatching calendar operation");

    match operation {
        Operation::Create(details) => {
            let record = calendar.create_event(&details).await?;
            Ok(CalendarResult::Created(record))
        }
        Operation::List(params) => {
            let events = calendar.list_events(&params).await?;
            Ok(CalendarResult::Events(events))
        }
        Operation::Update { event_id, patch } => {
            let record = calendar.update_event(&event_id, &patch).await?;
            Ok(CalendarResult::Updated(record))
        }
        Operation::Delete { event_id } => {
            let deleted = calendar.delete_event(&event_id).await?;
            Ok(CalendarResult::Deleted(DeleteStatus::new(deleted, event_id)))
        }
    }
}
