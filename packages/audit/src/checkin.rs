//! # Check-in submission
//!
//! [`submit_checkin`] records one checkpoint visit:
//!
//! 1. Pre-check the submission without touching the network (proof photo
//!    present; an incident needs a damage photo and a description).
//! 2. Load the round progress and make sure the checkpoint belongs to the
//!    caller's assignment and is the next actionable one. A scanned tag code
//!    must match the location's verification code.
//! 3. Upload the proof photo, then the damage photo if an incident is
//!    reported, keeping the signed URLs.
//! 4. Validate the assembled row and insert it.
//!
//! Every step can fail on its own and there is no retry. Photos uploaded
//! before a later failure are removed best-effort. Advancing the assignment
//! status is a separate step, see [`crate::assignments::record_checkin`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Checkin, NewCheckin};
use crate::photos::{discard_photos, photo_path, upload_photo, PhotoKind, PhotoUpload};
use crate::progress::{load_progress, CheckpointState};
use crate::store::{AuditStore, PhotoStore};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckinSubmission {
    pub assignment_id: String,
    pub location_id: String,
    pub proof_photo: Option<PhotoUpload>,
    pub has_incident: bool,
    pub damage_photo: Option<PhotoUpload>,
    pub damage_description: Option<String>,
    /// Code read from the checkpoint's NFC tag or QR sticker, if scanned.
    pub scanned_code: Option<String>,
}

fn present(photo: &Option<PhotoUpload>) -> bool {
    photo.as_ref().map_or(false, |p| !p.is_empty())
}

fn non_blank(text: &Option<String>) -> bool {
    text.as_ref().map_or(false, |t| !t.trim().is_empty())
}

impl CheckinSubmission {
    /// Checks that need no I/O. Returns every failure at once.
    pub fn precheck(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.assignment_id.trim().is_empty() {
            errors.push("Assignment is required".to_string());
        }
        if self.location_id.trim().is_empty() {
            errors.push("Location is required".to_string());
        }
        if !present(&self.proof_photo) {
            errors.push("A proof photo is required".to_string());
        }
        if self.has_incident {
            if !present(&self.damage_photo) {
                errors.push("A photo of the damage is required when reporting an incident".to_string());
            }
            if !non_blank(&self.damage_description) {
                errors.push("Describe the incident".to_string());
            }
        }
        errors
    }
}

impl NewCheckin {
    /// Row-level invariants checked right before the insert.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.location_id.is_empty() {
            errors.push("Location is required".to_string());
        }
        if self.assignment_id.is_empty() {
            errors.push("Assignment is required".to_string());
        }
        if self.proof_photo_url.is_empty() {
            errors.push("Proof photo URL is missing".to_string());
        }
        if self.has_incident {
            if self.damage_photo_url.as_deref().map_or(true, str::is_empty) {
                errors.push("Damage photo URL is missing".to_string());
            }
            if !non_blank(&self.damage_description) {
                errors.push("Describe the incident".to_string());
            }
        }
        errors
    }
}

/// Record a check-in for `user_id`. See the module docs for the steps.
pub async fn submit_checkin<S, P>(
    store: &S,
    photos: &P,
    user_id: &str,
    submission: CheckinSubmission,
    now: DateTime<Utc>,
) -> Result<Checkin>
where
    S: AuditStore,
    P: PhotoStore,
{
    let errors = submission.precheck();
    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }

    let progress = load_progress(store, &submission.assignment_id).await?;
    if progress.assignment.user_id != user_id {
        return Err(Error::Forbidden);
    }
    if progress.assignment.status.is_terminal() {
        return Err(Error::invalid("This round is already closed"));
    }
    match progress.state_of(&submission.location_id) {
        None => return Err(Error::invalid("This checkpoint is not part of the round")),
        Some(CheckpointState::Completed) => {
            return Err(Error::invalid("This checkpoint has already been checked in"))
        }
        Some(CheckpointState::Locked) => {
            return Err(Error::invalid("Complete the previous checkpoints first"))
        }
        Some(CheckpointState::Next) => {}
    }

    let nfc_verified = match submission.scanned_code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => {
            let expected = progress
                .checkpoints
                .iter()
                .find(|c| c.location.id == submission.location_id)
                .map(|c| c.location.verification_code.as_str())
                .unwrap_or_default();
            if code != expected {
                return Err(Error::invalid(
                    "The scanned tag does not belong to this checkpoint",
                ));
            }
            true
        }
        _ => false,
    };

    let mut uploaded: Vec<String> = Vec::new();

    let proof = match &submission.proof_photo {
        Some(photo) => photo,
        None => return Err(Error::invalid("A proof photo is required")),
    };
    let path = photo_path(user_id, &submission.assignment_id, PhotoKind::Proof, now);
    let proof_url = match upload_photo(photos, path.clone(), proof).await {
        Ok((path, url)) => {
            uploaded.push(path);
            url
        }
        Err(e) => {
            // A failed signing still leaves the object behind.
            discard_photos(photos, &[path]).await;
            return Err(e);
        }
    };

    let mut damage_url = None;
    if submission.has_incident {
        if let Some(photo) = &submission.damage_photo {
            let path = photo_path(user_id, &submission.assignment_id, PhotoKind::Damage, now);
            match upload_photo(photos, path.clone(), photo).await {
                Ok((path, url)) => {
                    uploaded.push(path);
                    damage_url = Some(url);
                }
                Err(e) => {
                    uploaded.push(path);
                    discard_photos(photos, &uploaded).await;
                    return Err(e);
                }
            }
        }
    }

    let row = NewCheckin {
        assignment_id: submission.assignment_id,
        location_id: submission.location_id,
        user_id: user_id.to_string(),
        proof_photo_url: proof_url,
        has_incident: submission.has_incident,
        damage_photo_url: damage_url,
        damage_description: if submission.has_incident {
            submission.damage_description.map(|d| d.trim().to_string())
        } else {
            None
        },
        nfc_verified,
        created_at: now,
    };
    let errors = row.validate();
    if !errors.is_empty() {
        discard_photos(photos, &uploaded).await;
        return Err(Error::Validation(errors));
    }

    match store.insert_checkin(row).await {
        Ok(checkin) => Ok(checkin),
        Err(e) => {
            discard_photos(photos, &uploaded).await;
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryPhotoStore;
    use crate::testing::{at, jpeg, scenario};

    fn submission(assignment_id: &str, location_id: &str) -> CheckinSubmission {
        CheckinSubmission {
            assignment_id: assignment_id.to_string(),
            location_id: location_id.to_string(),
            proof_photo: Some(jpeg()),
            has_incident: false,
            damage_photo: None,
            damage_description: None,
            scanned_code: None,
        }
    }

    #[tokio::test]
    async fn test_checkin_without_incident() {
        let s = scenario().await;
        let photos = MemoryPhotoStore::new();
        let mut sub = submission(&s.assignment.id, &s.locations[0].id);
        sub.scanned_code = Some("TAG-0".to_string());

        let checkin = submit_checkin(&s.store, &photos, &s.staff.id, sub, at(23, 5))
            .await
            .unwrap();

        assert!(checkin.nfc_verified);
        assert!(!checkin.has_incident);
        assert!(checkin.damage_photo_url.is_none());
        let expected_path = format!(
            "{}/{}/proof_{}.jpg",
            s.staff.id,
            s.assignment.id,
            at(23, 5).timestamp_millis()
        );
        assert_eq!(photos.paths(), vec![expected_path]);
        assert!(checkin.proof_photo_url.contains("proof_"));
    }

    #[tokio::test]
    async fn test_incident_without_description_is_rejected_before_upload() {
        let s = scenario().await;
        let photos = MemoryPhotoStore::new();
        let mut sub = submission(&s.assignment.id, &s.locations[0].id);
        sub.has_incident = true;
        sub.damage_photo = Some(jpeg());
        sub.damage_description = Some("   ".to_string());

        let err = submit_checkin(&s.store, &photos, &s.staff.id, sub, at(23, 5))
            .await
            .unwrap_err();

        assert_eq!(err, Error::Validation(vec!["Describe the incident".to_string()]));
        assert!(photos.paths().is_empty());
        assert!(s.store.list_checkins(&s.assignment.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_incident_stores_both_photos() {
        let s = scenario().await;
        let photos = MemoryPhotoStore::new();
        let mut sub = submission(&s.assignment.id, &s.locations[0].id);
        sub.has_incident = true;
        sub.damage_photo = Some(jpeg());
        sub.damage_description = Some(" Broken window ".to_string());

        let checkin = submit_checkin(&s.store, &photos, &s.staff.id, sub, at(23, 5))
            .await
            .unwrap();

        assert!(checkin.has_incident);
        assert!(checkin.damage_photo_url.is_some());
        assert_eq!(checkin.damage_description.as_deref(), Some("Broken window"));
        assert_eq!(photos.paths().len(), 2);
    }

    #[tokio::test]
    async fn test_no_incident_ignores_damage_fields() {
        let s = scenario().await;
        let photos = MemoryPhotoStore::new();
        let mut sub = submission(&s.assignment.id, &s.locations[0].id);
        sub.damage_description = Some("leftover text".to_string());

        let checkin = submit_checkin(&s.store, &photos, &s.staff.id, sub, at(23, 5))
            .await
            .unwrap();
        assert!(checkin.damage_description.is_none());
    }

    #[tokio::test]
    async fn test_missing_proof_photo() {
        let s = scenario().await;
        let mut sub = submission(&s.assignment.id, &s.locations[0].id);
        sub.proof_photo = None;

        let err = submit_checkin(&s.store, &MemoryPhotoStore::new(), &s.staff.id, sub, at(23, 5))
            .await
            .unwrap_err();
        assert_eq!(err.messages(), vec!["A proof photo is required".to_string()]);
    }

    #[tokio::test]
    async fn test_locked_and_foreign_checkpoints() {
        let s = scenario().await;
        let photos = MemoryPhotoStore::new();

        let locked = submission(&s.assignment.id, &s.locations[2].id);
        let err = submit_checkin(&s.store, &photos, &s.staff.id, locked, at(23, 5))
            .await
            .unwrap_err();
        assert_eq!(err, Error::invalid("Complete the previous checkpoints first"));

        let foreign = submission(&s.assignment.id, "loc-unknown");
        let err = submit_checkin(&s.store, &photos, &s.staff.id, foreign, at(23, 5))
            .await
            .unwrap_err();
        assert_eq!(err, Error::invalid("This checkpoint is not part of the round"));

        let other_user = submission(&s.assignment.id, &s.locations[0].id);
        let err = submit_checkin(&s.store, &photos, &s.admin.id, other_user, at(23, 5))
            .await
            .unwrap_err();
        assert_eq!(err, Error::Forbidden);
        assert!(photos.paths().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_tag_is_rejected() {
        let s = scenario().await;
        let mut sub = submission(&s.assignment.id, &s.locations[0].id);
        sub.scanned_code = Some("TAG-2".to_string());

        let err = submit_checkin(&s.store, &MemoryPhotoStore::new(), &s.staff.id, sub, at(23, 5))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            Error::invalid("The scanned tag does not belong to this checkpoint")
        );
    }

    #[tokio::test]
    async fn test_unknown_assignment() {
        let s = scenario().await;
        let sub = submission("assignment-missing", &s.locations[0].id);
        let err = submit_checkin(&s.store, &MemoryPhotoStore::new(), &s.staff.id, sub, at(23, 5))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "assignment not found");
    }

    #[tokio::test]
    async fn test_failed_insert_removes_uploaded_photos() {
        let s = scenario().await;
        let photos = MemoryPhotoStore::new();
        s.store.fail_checkin_inserts("connection reset");

        let err = submit_checkin(
            &s.store,
            &photos,
            &s.staff.id,
            submission(&s.assignment.id, &s.locations[0].id),
            at(23, 5),
        )
        .await
        .unwrap_err();

        assert_eq!(err, Error::Backend("connection reset".to_string()));
        assert!(photos.paths().is_empty());
    }

    #[tokio::test]
    async fn test_failed_damage_upload_removes_proof() {
        let s = scenario().await;
        let photos = MemoryPhotoStore::failing_after(1);
        let mut sub = submission(&s.assignment.id, &s.locations[0].id);
        sub.has_incident = true;
        sub.damage_photo = Some(jpeg());
        sub.damage_description = Some("Water leak".to_string());

        let err = submit_checkin(&s.store, &photos, &s.staff.id, sub, at(23, 5))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Storage(_)));
        assert!(photos.paths().is_empty());
    }

    #[tokio::test]
    async fn test_second_checkin_for_same_checkpoint() {
        let s = scenario().await;
        let photos = MemoryPhotoStore::new();
        let sub = submission(&s.assignment.id, &s.locations[0].id);

        submit_checkin(&s.store, &photos, &s.staff.id, sub.clone(), at(23, 5))
            .await
            .unwrap();
        let err = submit_checkin(&s.store, &photos, &s.staff.id, sub, at(23, 6))
            .await
            .unwrap_err();
        assert_eq!(err, Error::invalid("This checkpoint has already been checked in"));
    }
}
