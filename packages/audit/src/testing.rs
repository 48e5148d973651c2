//! Shared fixtures for the crate's test suites.

use chrono::{DateTime, NaiveDate, Utc};

use crate::memory::MemoryStore;
use crate::models::*;
use crate::photos::PhotoUpload;
use crate::store::AuditStore;

pub(crate) struct Scenario {
    pub store: MemoryStore,
    pub staff: Profile,
    pub admin: Profile,
    pub locations: Vec<Location>,
    pub round: Round,
    pub assignment: DailyAssignment,
}

pub(crate) fn night() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
}

pub(crate) fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    night().and_hms_opt(hour, minute, 0).unwrap().and_utc()
}

pub(crate) fn jpeg() -> PhotoUpload {
    PhotoUpload::from_bytes("image/jpeg", &[0xff, 0xd8, 0xff, 0xe0])
}

/// A staff member assigned a three-checkpoint night round.
pub(crate) async fn scenario() -> Scenario {
    let store = MemoryStore::new();
    let staff = store
        .insert_profile(NewProfile {
            email: "porter@hotel.test".to_string(),
            full_name: "Night Porter".to_string(),
            role: Role::Staff,
            password_hash: "hash".to_string(),
        })
        .await
        .unwrap();
    let admin = store
        .insert_profile(NewProfile {
            email: "manager@hotel.test".to_string(),
            full_name: "Duty Manager".to_string(),
            role: Role::Admin,
            password_hash: "hash".to_string(),
        })
        .await
        .unwrap();

    let mut locations = Vec::new();
    for (floor, name) in [(0, "Lobby"), (1, "Linen room"), (2, "Fire exit")] {
        let location = store
            .insert_location(NewLocation {
                name: name.to_string(),
                floor,
                building: "Main".to_string(),
                verification_code: format!("TAG-{floor}"),
            })
            .await
            .unwrap();
        locations.push(location);
    }

    let round = store
        .insert_round(NewRound {
            name: "Night round".to_string(),
            location_ids: locations.iter().map(|l| l.id.clone()).collect(),
            estimated_minutes: 40,
        })
        .await
        .unwrap();
    let assignment = store
        .insert_assignment(NewAssignment {
            user_id: staff.id.clone(),
            round_id: round.id.clone(),
            date: night(),
            shift: Shift::Night,
        })
        .await
        .unwrap();

    Scenario {
        store,
        staff,
        admin,
        locations,
        round,
        assignment,
    }
}
