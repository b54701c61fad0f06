//! CLI commands

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Subcommand};
use roombook_core::{ClientSettings, Page, Route};
use roombook_http::ApiClient;
use roombook_http::types::{
    CreateMeetingRoom, MeetingRoomSearch, SearchBooking, UpdateMeetingRoom, UpdatePassword,
    UpdateUserInfo, UserDetail, UserSearch,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in as an administrator
    Login {
        username: String,

        /// Password (prompted environments can pass it via ROOMBOOK_PASSWORD)
        #[arg(long, env = "ROOMBOOK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget stored credentials
    Logout,

    /// Show the signed-in administrator
    Whoami {
        /// Fetch the profile from the server instead of the cached copy
        #[arg(long)]
        refresh: bool,
    },

    /// User management
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Meeting room management
    Rooms {
        #[command(subcommand)]
        command: RoomCommands,
    },

    /// Booking management
    Bookings {
        #[command(subcommand)]
        command: BookingCommands,
    },

    /// Upload a file (e.g. an avatar) through a presigned URL
    Upload {
        file: PathBuf,

        /// Object name, defaults to the file name
        #[arg(long)]
        name: Option<String>,
    },

    /// Show the effective configuration
    Config,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct PageArgs {
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    page: u32,

    #[arg(long, default_value_t = roombook_core::pagination::DEFAULT_PAGE_SIZE)]
    page_size: u32,
}

impl From<PageArgs> for Page {
    fn from(args: PageArgs) -> Self {
        Self::new(args.page, args.page_size)
    }
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Search users
    List {
        #[arg(long, default_value = "")]
        username: String,
        #[arg(long, default_value = "")]
        nick_name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[command(flatten)]
        page: PageArgs,
    },

    /// Freeze a user account
    Freeze { id: i64 },

    /// Send a profile-update captcha to your email
    Captcha,

    /// Update your profile
    UpdateInfo {
        #[arg(long)]
        email: String,
        #[arg(long)]
        captcha: String,
        #[arg(long)]
        nick_name: Option<String>,
        /// Avatar object name, as returned by `upload`
        #[arg(long)]
        head_pic: Option<String>,
    },

    /// Send a password-change captcha to an email address
    PasswordCaptcha { email: String },

    /// Change your password
    UpdatePassword {
        #[arg(long)]
        email: String,
        #[arg(long)]
        captcha: String,
        #[arg(long, env = "ROOMBOOK_NEW_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[derive(Subcommand)]
pub enum RoomCommands {
    /// Search meeting rooms
    List {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long)]
        capacity: Option<u32>,
        #[arg(long, default_value = "")]
        equipment: String,
        #[command(flatten)]
        page: PageArgs,
    },

    /// Show one meeting room
    Show { id: i64 },

    /// Create a meeting room
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        capacity: u32,
        #[arg(long)]
        location: String,
        #[arg(long)]
        equipment: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    /// Update fields of a meeting room
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        capacity: Option<u32>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        equipment: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a meeting room
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum BookingCommands {
    /// Search bookings
    List {
        #[arg(long, default_value = "")]
        username: String,
        #[arg(long, default_value = "")]
        room_name: String,
        #[arg(long, default_value = "")]
        room_position: String,
        /// Range start date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<NaiveDate>,
        /// Range start time (HH:MM), midnight when omitted
        #[arg(long)]
        start_time: Option<NaiveTime>,
        /// Range end date (YYYY-MM-DD), needs --end-time
        #[arg(long)]
        end_date: Option<NaiveDate>,
        #[arg(long)]
        end_time: Option<NaiveTime>,
        #[command(flatten)]
        page: PageArgs,
    },

    /// Approve a booking
    Apply { id: i64 },

    /// Reject a booking
    Reject { id: i64 },

    /// Release a booking
    Unbind { id: i64 },
}

impl Commands {
    pub async fn execute(self, client: &ApiClient, settings: &ClientSettings) -> Result<()> {
        match self {
            Self::Login { username, password } => {
                let user = client.login(&username, &password).await?;
                client.notifier().success("登录成功");
                // Equivalent of landing on the default view after login
                client.navigation().navigate(Route::MeetingRoomManage);
                print_json(&user)
            }
            Self::Logout => {
                client.logout()?;
                info!("Credentials cleared");
                Ok(())
            }
            Self::Whoami { refresh } => whoami(client, refresh).await,
            Self::Users { command } => command.execute(client).await,
            Self::Rooms { command } => command.execute(client).await,
            Self::Bookings { command } => command.execute(client).await,
            Self::Upload { file, name } => upload(client, file, name).await,
            Self::Config => print_json(settings),
        }
    }
}

impl UserCommands {
    pub async fn execute(self, client: &ApiClient) -> Result<()> {
        match self {
            Self::List {
                username,
                nick_name,
                email,
                page,
            } => {
                let search = UserSearch {
                    username,
                    nick_name,
                    email,
                };
                print_json(&client.user_search(&search, page.into()).await?)
            }
            Self::Freeze { id } => {
                client.freeze(id).await?;
                client.notifier().success("冻结成功");
                Ok(())
            }
            Self::Captcha => {
                let message = client.update_info_captcha().await?;
                client.notifier().success(&message);
                Ok(())
            }
            Self::UpdateInfo {
                email,
                captcha,
                nick_name,
                head_pic,
            } => {
                let update = UpdateUserInfo {
                    head_pic,
                    nick_name,
                    email,
                    captcha,
                };
                client.update_info(&update).await?;
                client.notifier().success("用户信息更新成功");
                Ok(())
            }
            Self::PasswordCaptcha { email } => {
                let message = client.update_password_captcha(&email).await?;
                client.notifier().success(&message);
                Ok(())
            }
            Self::UpdatePassword {
                email,
                captcha,
                password,
            } => {
                let update = UpdatePassword {
                    email,
                    captcha,
                    password,
                };
                client.update_password(&update).await?;
                client.notifier().success("密码修改成功");
                Ok(())
            }
        }
    }
}

impl RoomCommands {
    pub async fn execute(self, client: &ApiClient) -> Result<()> {
        match self {
            Self::List {
                name,
                capacity,
                equipment,
                page,
            } => {
                let search = MeetingRoomSearch {
                    name,
                    capacity,
                    equipment,
                };
                print_json(&client.meeting_room_list(&search, page.into()).await?)
            }
            Self::Show { id } => print_json(&client.find_meeting_room(id).await?),
            Self::Create {
                name,
                capacity,
                location,
                equipment,
                description,
            } => {
                let room = CreateMeetingRoom {
                    name,
                    capacity,
                    location,
                    equipment,
                    description,
                };
                client.create_meeting_room(&room).await?;
                client.notifier().success("创建成功");
                Ok(())
            }
            Self::Update {
                id,
                name,
                capacity,
                location,
                equipment,
                description,
            } => {
                let room = UpdateMeetingRoom {
                    id,
                    name,
                    capacity,
                    location,
                    equipment,
                    description,
                };
                client.update_meeting_room(&room).await?;
                client.notifier().success("更新成功");
                Ok(())
            }
            Self::Delete { id } => {
                client.delete_meeting_room(id).await?;
                client.notifier().success("删除成功");
                Ok(())
            }
        }
    }
}

impl BookingCommands {
    pub async fn execute(self, client: &ApiClient) -> Result<()> {
        match self {
            Self::List {
                username,
                room_name,
                room_position,
                start_date,
                start_time,
                end_date,
                end_time,
                page,
            } => {
                let search = SearchBooking {
                    username,
                    meeting_room_name: room_name,
                    meeting_room_position: room_position,
                    range_start_date: start_date,
                    range_start_time: start_time,
                    range_end_date: end_date,
                    range_end_time: end_time,
                };
                print_json(&client.booking_list(&search, page.into()).await?)
            }
            Self::Apply { id } => {
                client.apply(id).await?;
                client.notifier().success("审批通过");
                Ok(())
            }
            Self::Reject { id } => {
                client.reject(id).await?;
                client.notifier().success("已驳回");
                Ok(())
            }
            Self::Unbind { id } => {
                client.unbind(id).await?;
                client.notifier().success("已解除");
                Ok(())
            }
        }
    }
}

async fn whoami(client: &ApiClient, refresh: bool) -> Result<()> {
    let user = if refresh {
        Some(client.user_info().await?)
    } else {
        client.cached_user_info()?
    };

    let Some(user) = user else {
        anyhow::bail!("Not logged in, run `roombook login` first");
    };
    print_user(&user)
}

fn print_user(user: &UserDetail) -> Result<()> {
    println!("{} ({})", user.username, user.nick_name.as_deref().unwrap_or("-"));
    if let Some(head_pic) = &user.head_pic {
        println!("avatar: {head_pic}");
    }
    Ok(())
}

async fn upload(client: &ApiClient, file: PathBuf, name: Option<String>) -> Result<()> {
    let name = match name {
        Some(name) => name,
        None => file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .context("Upload path has no file name")?,
    };
    let body = tokio::fs::read(&file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let url = client.presigned_url(&name).await?;
    client.upload_object(&url, body).await?;
    client.notifier().success("上传成功");
    println!("{name}");
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
