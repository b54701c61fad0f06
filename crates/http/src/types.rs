//! Wire types of the booking admin API

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use roombook_core::{Paginated, TimeRangeInput};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body shape every backend response is wrapped in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    /// Human-readable message: `data` when it is a string, else `message`
    pub fn describe(&self) -> Option<String> {
        match &self.data {
            Value::String(text) if !text.is_empty() => Some(text.clone()),
            _ => self.message.clone().filter(|m| !m.is_empty()),
        }
    }
}

// Auth

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_info: UserDetail,
    pub access_token: String,
    pub refresh_token: String,
}

// Users

/// Profile of the logged-in administrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub nick_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub head_pic: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub is_frozen: bool,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<Value>,
}

/// Row of the user management table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub nick_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub head_pic: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub is_frozen: bool,
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    pub users: Vec<UserSummary>,
    pub total_count: u64,
}

impl From<UserListResponse> for Paginated<UserSummary> {
    fn from(list: UserListResponse) -> Self {
        Self::new(list.users, list.total_count)
    }
}

/// Filters of the user search form; empty strings match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSearch {
    pub username: String,
    pub nick_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_pic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nick_name: Option<String>,
    pub email: String,
    pub captcha: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePassword {
    pub email: String,
    pub captcha: String,
    pub password: String,
}

// Meeting rooms

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingRoom {
    pub id: i64,
    pub name: String,
    pub capacity: u32,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub equipment: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_booked: bool,
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub update_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingRoomListResponse {
    pub meeting_rooms: Vec<MeetingRoom>,
    pub total_count: u64,
}

impl From<MeetingRoomListResponse> for Paginated<MeetingRoom> {
    fn from(list: MeetingRoomListResponse) -> Self {
        Self::new(list.meeting_rooms, list.total_count)
    }
}

/// Filters of the meeting room search form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeetingRoomSearch {
    pub name: String,
    pub capacity: Option<u32>,
    pub equipment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeetingRoom {
    pub name: String,
    pub capacity: u32,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeetingRoom {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// Bookings

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingUser {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub nick_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    #[serde(default)]
    pub note: Option<String>,
    pub user: BookingUser,
    pub room: MeetingRoom,
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub update_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingListResponse {
    pub bookings: Vec<Booking>,
    pub total_count: u64,
}

impl From<BookingListResponse> for Paginated<Booking> {
    fn from(list: BookingListResponse) -> Self {
        Self::new(list.bookings, list.total_count)
    }
}

/// Filters of the booking search form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchBooking {
    pub username: String,
    pub meeting_room_name: String,
    pub meeting_room_position: String,
    pub range_start_date: Option<NaiveDate>,
    pub range_start_time: Option<NaiveTime>,
    pub range_end_date: Option<NaiveDate>,
    pub range_end_time: Option<NaiveTime>,
}

impl SearchBooking {
    pub const fn time_range(&self) -> TimeRangeInput {
        TimeRangeInput {
            start_date: self.range_start_date,
            start_time: self.range_start_time,
            end_date: self.range_end_date,
            end_time: self.range_end_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_prefers_string_data_as_message() {
        let envelope: Envelope = serde_json::from_value(json!({
            "code": 400,
            "message": "fail",
            "data": "验证码已失效"
        }))
        .unwrap();
        assert_eq!(envelope.describe().as_deref(), Some("验证码已失效"));

        let envelope: Envelope =
            serde_json::from_value(json!({ "code": 500, "message": "Internal" })).unwrap();
        assert_eq!(envelope.describe().as_deref(), Some("Internal"));
    }

    #[test]
    fn user_rows_tolerate_missing_optional_fields() {
        let list: UserListResponse = serde_json::from_value(json!({
            "users": [
                { "id": 1, "username": "alice", "createTime": "2024-01-01T09:00:00.000Z" },
                { "id": 2, "username": "bob", "isFrozen": true }
            ],
            "totalCount": 2
        }))
        .unwrap();

        let page: Paginated<UserSummary> = list.into();
        assert_eq!(page.total_count, 2);
        assert!(page.rows[0].create_time.is_some());
        assert!(page.rows[1].is_frozen);
    }

    #[test]
    fn update_room_omits_unchanged_fields() {
        let body = serde_json::to_value(UpdateMeetingRoom {
            id: 3,
            name: None,
            capacity: Some(12),
            location: None,
            equipment: None,
            description: None,
        })
        .unwrap();
        assert_eq!(body, json!({ "id": 3, "capacity": 12 }));
    }
}
