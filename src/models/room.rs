// src/models/room.rs
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::booking::StayPeriod;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: u32,
    pub name: String,
    pub nightly_rate: Decimal,
}

/// Price computed for a stay; never taken from user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub nights: u32,
    pub nightly_rate: Decimal,
    pub total_amount: Decimal,
}

/// The hotel's room price table
#[derive(Debug, Clone)]
pub struct RoomCatalog {
    rooms: Vec<Room>,
}

impl RoomCatalog {
    pub fn new(rooms: Vec<Room>) -> Self {
        Self { rooms }
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn find(&self, room_id: u32) -> Option<&Room> {
        self.rooms.iter().find(|room| room.id == room_id)
    }

    pub fn quote(&self, room_id: u32, stay: &StayPeriod) -> Option<Quote> {
        let room = self.find(room_id)?;
        let nights = stay.nights();

        Some(Quote {
            nights,
            nightly_rate: room.nightly_rate,
            total_amount: room.nightly_rate * Decimal::from(nights),
        })
    }
}

impl Default for RoomCatalog {
    fn default() -> Self {
        let rate = Decimal::from(150_000);
        let rooms = [
            (1, "Grace Suite"),
            (2, "Peace Suite"),
            (3, "Comfort"),
            (4, "Blessing Suite"),
            (5, "Happiness Suite"),
        ]
        .into_iter()
        .map(|(id, name)| Room {
            id,
            name: name.to_string(),
            nightly_rate: rate,
        })
        .collect();

        Self::new(rooms)
    }
}
