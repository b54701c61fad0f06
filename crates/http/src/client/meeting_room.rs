//! Meeting room API client methods

use super::{ApiClient, ApiRequest, ClientError};
use crate::types::{
    CreateMeetingRoom, MeetingRoom, MeetingRoomListResponse, MeetingRoomSearch, UpdateMeetingRoom,
};
use roombook_core::{Page, Paginated};

impl ApiClient {
    pub async fn meeting_room_list(
        &self,
        search: &MeetingRoomSearch,
        page: Page,
    ) -> Result<Paginated<MeetingRoom>, ClientError> {
        let request = ApiRequest::get("/meeting-room/list")
            .query("name", &search.name)
            .query_opt("capacity", search.capacity)
            .query("equipment", &search.equipment)
            .query("pageNo", page.page_no)
            .query("pageSize", page.page_size);
        let response: MeetingRoomListResponse = self.request(request).await?;
        Ok(response.into())
    }

    pub async fn delete_meeting_room(&self, id: i64) -> Result<(), ClientError> {
        self.request_unit(ApiRequest::delete(format!("/meeting-room/{id}")))
            .await
    }

    pub async fn create_meeting_room(&self, room: &CreateMeetingRoom) -> Result<(), ClientError> {
        let request = ApiRequest::post("/meeting-room/create").json(room)?;
        self.request_unit(request).await
    }

    pub async fn update_meeting_room(&self, room: &UpdateMeetingRoom) -> Result<(), ClientError> {
        let request = ApiRequest::put("/meeting-room/update").json(room)?;
        self.request_unit(request).await
    }

    pub async fn find_meeting_room(&self, id: i64) -> Result<MeetingRoom, ClientError> {
        self.request(ApiRequest::get(format!("/meeting-room/{id}")))
            .await
    }
}
