//! Booking API client methods

use super::{ApiClient, ApiRequest, ClientError};
use crate::types::{Booking, BookingListResponse, SearchBooking};
use roombook_core::{Page, Paginated};

impl ApiClient {
    /// Search bookings.
    ///
    /// The date and time pickers are folded into epoch-millisecond bounds;
    /// bounds that cannot be computed are left out of the query.
    pub async fn booking_list(
        &self,
        search: &SearchBooking,
        page: Page,
    ) -> Result<Paginated<Booking>, ClientError> {
        let request = booking_list_request(search, page);
        let response: BookingListResponse = self.request(request).await?;
        Ok(response.into())
    }

    /// Approve a booking
    pub async fn apply(&self, id: i64) -> Result<(), ClientError> {
        self.request_unit(ApiRequest::get(format!("/booking/apply/{id}")))
            .await
    }

    /// Reject a booking
    pub async fn reject(&self, id: i64) -> Result<(), ClientError> {
        self.request_unit(ApiRequest::get(format!("/booking/reject/{id}")))
            .await
    }

    /// Release a booking
    pub async fn unbind(&self, id: i64) -> Result<(), ClientError> {
        self.request_unit(ApiRequest::get(format!("/booking/unbind/{id}")))
            .await
    }
}

pub(crate) fn booking_list_request(search: &SearchBooking, page: Page) -> ApiRequest {
    let bounds = search.time_range().resolve();
    ApiRequest::get("/booking/list")
        .query("username", &search.username)
        .query("meetingRoomName", &search.meeting_room_name)
        .query("meetingRoomPosition", &search.meeting_room_position)
        .query_opt("bookingTimeRangeStart", bounds.start)
        .query_opt("bookingTimeRangeEnd", bounds.end)
        .query("pageNo", page.page_no)
        .query("pageSize", page.page_size)
}
