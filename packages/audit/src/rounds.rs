//! Round and checkpoint management for administrators.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::models::{Location, NewLocation, NewRound, Round};
use crate::store::AuditStore;

pub async fn create_location<S: AuditStore>(store: &S, location: NewLocation) -> Result<Location> {
    let mut errors = Vec::new();
    if location.name.trim().is_empty() {
        errors.push("Location name is required".to_string());
    }
    if location.building.trim().is_empty() {
        errors.push("Building is required".to_string());
    }
    if location.verification_code.trim().is_empty() {
        errors.push("A tag code is required".to_string());
    }
    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }

    let location = store
        .insert_location(NewLocation {
            name: location.name.trim().to_string(),
            floor: location.floor,
            building: location.building.trim().to_string(),
            verification_code: location.verification_code.trim().to_string(),
        })
        .await?;
    tracing::info!("Created location {} ({})", location.name, location.id);
    Ok(location)
}

pub async fn create_round<S: AuditStore>(store: &S, round: NewRound) -> Result<Round> {
    let mut errors = Vec::new();
    if round.name.trim().is_empty() {
        errors.push("Round name is required".to_string());
    }
    if round.location_ids.is_empty() {
        errors.push("Pick at least one checkpoint".to_string());
    }
    if round.estimated_minutes <= 0 {
        errors.push("Estimated duration must be positive".to_string());
    }
    let known: HashSet<String> = store
        .list_locations()
        .await?
        .into_iter()
        .map(|l| l.id)
        .collect();
    if let Some(missing) = round.location_ids.iter().find(|id| !known.contains(*id)) {
        errors.push(format!("Unknown checkpoint: {missing}"));
    }
    let mut seen = HashSet::new();
    if let Some(repeated) = round.location_ids.iter().find(|id| !seen.insert(id.as_str())) {
        errors.push(format!("Checkpoint listed twice: {repeated}"));
    }
    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }

    let round = store
        .insert_round(NewRound {
            name: round.name.trim().to_string(),
            ..round
        })
        .await?;
    tracing::info!("Created round {} ({})", round.name, round.id);
    Ok(round)
}

/// Copy a round's checkpoint order and duration under a new name.
/// Defaults to "<name> (copy)".
pub async fn duplicate_round<S: AuditStore>(
    store: &S,
    round_id: &str,
    name: Option<String>,
) -> Result<Round> {
    let source = store
        .get_round(round_id)
        .await?
        .ok_or_else(|| Error::not_found("round", round_id))?;
    let name = name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("{} (copy)", source.name));

    store
        .insert_round(NewRound {
            name,
            location_ids: source.location_ids,
            estimated_minutes: source.estimated_minutes,
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::scenario;

    #[tokio::test]
    async fn test_duplicate_copies_order_and_duration() {
        let s = scenario().await;
        let mut reversed = s.round.location_ids.clone();
        reversed.reverse();
        let source = create_round(
            &s.store,
            NewRound {
                name: "Reverse".to_string(),
                location_ids: reversed.clone(),
                estimated_minutes: 55,
            },
        )
        .await
        .unwrap();

        let copy = duplicate_round(&s.store, &source.id, None).await.unwrap();

        assert_ne!(copy.id, source.id);
        assert_eq!(copy.name, "Reverse (copy)");
        assert_eq!(copy.location_ids, reversed);
        assert_eq!(copy.estimated_minutes, 55);

        let named = duplicate_round(&s.store, &source.id, Some("Weekend".to_string()))
            .await
            .unwrap();
        assert_eq!(named.name, "Weekend");
    }

    #[tokio::test]
    async fn test_duplicate_missing_round() {
        let s = scenario().await;
        let err = duplicate_round(&s.store, "nope", None).await.unwrap_err();
        assert_eq!(err.to_string(), "round not found");
    }

    #[tokio::test]
    async fn test_create_round_validation() {
        let s = scenario().await;
        let err = create_round(
            &s.store,
            NewRound {
                name: " ".to_string(),
                location_ids: vec!["ghost".to_string()],
                estimated_minutes: 0,
            },
        )
        .await
        .unwrap_err();

        assert_eq!(
            err.messages(),
            vec![
                "Round name is required".to_string(),
                "Estimated duration must be positive".to_string(),
                "Unknown checkpoint: ghost".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_create_round_rejects_repeated_checkpoint() {
        let s = scenario().await;
        let first = s.round.location_ids[0].clone();
        let second = s.round.location_ids[1].clone();
        let err = create_round(
            &s.store,
            NewRound {
                name: "Loop".to_string(),
                location_ids: vec![first.clone(), second, first.clone()],
                estimated_minutes: 20,
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.messages(), vec![format!("Checkpoint listed twice: {first}")]);
        assert_eq!(s.store.list_rounds().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_location_trims_and_rejects_duplicate_codes() {
        let s = scenario().await;
        let location = create_location(
            &s.store,
            NewLocation {
                name: " Roof access ".to_string(),
                floor: 7,
                building: "Main".to_string(),
                verification_code: " TAG-R ".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(location.name, "Roof access");
        assert_eq!(location.verification_code, "TAG-R");

        let err = create_location(
            &s.store,
            NewLocation {
                name: "Other".to_string(),
                floor: 1,
                building: "Main".to_string(),
                verification_code: "TAG-0".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Duplicate(_)));
    }
}
