//! Structural check applied to decoded snapshots before the store adopts them.

use shared::{domain::ReadinessSnapshot, error::ValidationError};

use crate::catalog::ControlCatalog;

/// Accepts a snapshot only if its controls are exactly the catalog ids in
/// catalog order. Area and label are re-read from the catalog, so wording
/// fixes to a label carry over to old records; status and notes are kept.
pub fn validate_snapshot(
    mut snapshot: ReadinessSnapshot,
) -> Result<ReadinessSnapshot, ValidationError> {
    let catalog = ControlCatalog::controls();
    if snapshot.controls.len() != catalog.len() {
        return Err(ValidationError::ControlCount {
            expected: catalog.len(),
            actual: snapshot.controls.len(),
        });
    }

    for (position, (control, definition)) in
        snapshot.controls.iter_mut().zip(catalog).enumerate()
    {
        if control.id != definition.id {
            return Err(ValidationError::ControlMismatch {
                position,
                expected: definition.id.to_string(),
                actual: control.id.clone(),
            });
        }
        control.area = definition.area;
        if control.label != definition.label {
            control.label = definition.label.to_string();
        }
    }

    Ok(snapshot)
}
