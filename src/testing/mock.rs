//! Scripted in-memory platform implementation.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::cloner::progress::ProgressSink;
use crate::net::image::ImageSource;
use crate::platform::error::PlatformError;
use crate::platform::types::{
    ChannelInfo, EmojiInfo, GuildProfile, GuildUpdate, NewChannel, NewRole, RoleInfo,
};
use crate::platform::{PlatformConnector, PlatformSession};

/// The contents of one fake server.
#[derive(Debug, Clone)]
pub struct GuildFixture {
    pub profile: GuildProfile,
    pub roles: Vec<RoleInfo>,
    pub channels: Vec<ChannelInfo>,
    pub emojis: Vec<EmojiInfo>,
}

impl GuildFixture {
    pub fn new(guild_id: u64, name: &str) -> Self {
        Self {
            profile: GuildProfile {
                guild_id,
                name: name.to_string(),
                icon_url: None,
            },
            roles: Vec::new(),
            channels: Vec::new(),
            emojis: Vec::new(),
        }
    }
}

/// Shared state behind every mock session produced by a [`MockConnector`].
///
/// Mutations are recorded rather than applied to the fixtures, so tests can
/// assert exactly what the engine asked the platform to do. Failures are
/// scripted per operation key: the specific form (`"create_role:mod"`) is
/// consulted before the generic one (`"create_role"`), and each scripted
/// failure fires exactly once.
pub struct MockState {
    guilds: Mutex<HashMap<u64, GuildFixture>>,
    failures: Mutex<HashMap<String, VecDeque<PlatformError>>>,
    connect_failures: Mutex<VecDeque<PlatformError>>,
    latency: Mutex<Duration>,
    next_id: AtomicU64,

    pub connects: AtomicU32,
    pub destroys: AtomicU32,
    pub created_roles: Mutex<Vec<(u64, NewRole)>>,
    pub created_channels: Mutex<Vec<(u64, NewChannel)>>,
    pub created_emojis: Mutex<Vec<(String, String)>>,
    pub deleted_channels: Mutex<Vec<u64>>,
    pub deleted_roles: Mutex<Vec<u64>>,
    pub role_positions: Mutex<Vec<(u64, u16)>>,
    pub guild_updates: Mutex<Vec<(u64, GuildUpdate)>>,
}

impl MockState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            guilds: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            connect_failures: Mutex::new(VecDeque::new()),
            latency: Mutex::new(Duration::ZERO),
            next_id: AtomicU64::new(9000),
            connects: AtomicU32::new(0),
            destroys: AtomicU32::new(0),
            created_roles: Mutex::new(Vec::new()),
            created_channels: Mutex::new(Vec::new()),
            created_emojis: Mutex::new(Vec::new()),
            deleted_channels: Mutex::new(Vec::new()),
            deleted_roles: Mutex::new(Vec::new()),
            role_positions: Mutex::new(Vec::new()),
            guild_updates: Mutex::new(Vec::new()),
        })
    }

    pub fn add_guild(&self, fixture: GuildFixture) {
        self.guilds.lock().insert(fixture.profile.guild_id, fixture);
    }

    /// Scripts the next matching operation to fail with `err`.
    pub fn fail_next(&self, key: &str, err: PlatformError) {
        self.failures
            .lock()
            .entry(key.to_string())
            .or_default()
            .push_back(err);
    }

    /// Scripts the next login attempt to fail with `err`.
    pub fn fail_connect(&self, err: PlatformError) {
        self.connect_failures.lock().push_back(err);
    }

    /// Adds an artificial delay at the start of `guild_profile`, letting
    /// tests hold a run in flight under a paused clock.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::AcqRel)
    }

    fn take_failure(&self, specific: &str, generic: &str) -> Option<PlatformError> {
        let mut failures = self.failures.lock();
        for key in [specific, generic] {
            if let Some(queue) = failures.get_mut(key) {
                if let Some(err) = queue.pop_front() {
                    return Some(err);
                }
            }
        }
        None
    }

    fn guild(&self, guild_id: u64) -> Result<GuildFixture, PlatformError> {
        self.guilds
            .lock()
            .get(&guild_id)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound("server".to_string()))
    }
}

/// Connector over a shared [`MockState`].
pub struct MockConnector {
    pub state: Arc<MockState>,
}

#[async_trait]
impl PlatformConnector for MockConnector {
    type Session = MockSession;

    async fn connect(&self, _credential: &str) -> Result<Self::Session, PlatformError> {
        if let Some(err) = self.state.connect_failures.lock().pop_front() {
            return Err(err);
        }

        self.state.connects.fetch_add(1, Ordering::AcqRel);
        Ok(MockSession {
            state: Arc::clone(&self.state),
        })
    }
}

/// One logged-in handle onto the shared state.
pub struct MockSession {
    state: Arc<MockState>,
}

#[async_trait]
impl PlatformSession for MockSession {
    async fn guild_profile(&self, guild_id: u64) -> Result<GuildProfile, PlatformError> {
        let latency = *self.state.latency.lock();
        if latency > Duration::ZERO {
            tokio::time::sleep(latency).await;
        }

        if let Some(err) = self
            .state
            .take_failure(&format!("guild_profile:{guild_id}"), "guild_profile")
        {
            return Err(err);
        }

        Ok(self.state.guild(guild_id)?.profile)
    }

    async fn roles(&self, guild_id: u64) -> Result<Vec<RoleInfo>, PlatformError> {
        if let Some(err) = self.state.take_failure(&format!("roles:{guild_id}"), "roles") {
            return Err(err);
        }
        Ok(self.state.guild(guild_id)?.roles)
    }

    async fn channels(&self, guild_id: u64) -> Result<Vec<ChannelInfo>, PlatformError> {
        if let Some(err) = self
            .state
            .take_failure(&format!("channels:{guild_id}"), "channels")
        {
            return Err(err);
        }
        Ok(self.state.guild(guild_id)?.channels)
    }

    async fn emojis(&self, guild_id: u64) -> Result<Vec<EmojiInfo>, PlatformError> {
        if let Some(err) = self.state.take_failure(&format!("emojis:{guild_id}"), "emojis") {
            return Err(err);
        }
        Ok(self.state.guild(guild_id)?.emojis)
    }

    async fn create_role(&self, _guild_id: u64, role: &NewRole) -> Result<u64, PlatformError> {
        if let Some(err) = self
            .state
            .take_failure(&format!("create_role:{}", role.name), "create_role")
        {
            return Err(err);
        }

        let id = self.state.next_id();
        self.state.created_roles.lock().push((id, role.clone()));
        Ok(id)
    }

    async fn delete_role(&self, _guild_id: u64, role_id: u64) -> Result<(), PlatformError> {
        if let Some(err) = self
            .state
            .take_failure(&format!("delete_role:{role_id}"), "delete_role")
        {
            return Err(err);
        }

        self.state.deleted_roles.lock().push(role_id);
        Ok(())
    }

    async fn set_role_position(
        &self,
        _guild_id: u64,
        role_id: u64,
        position: u16,
    ) -> Result<(), PlatformError> {
        if let Some(err) = self.state.take_failure(
            &format!("set_role_position:{role_id}"),
            "set_role_position",
        ) {
            return Err(err);
        }

        self.state.role_positions.lock().push((role_id, position));
        Ok(())
    }

    async fn create_channel(
        &self,
        _guild_id: u64,
        channel: &NewChannel,
    ) -> Result<u64, PlatformError> {
        if let Some(err) = self
            .state
            .take_failure(&format!("create_channel:{}", channel.name), "create_channel")
        {
            return Err(err);
        }

        let id = self.state.next_id();
        self.state
            .created_channels
            .lock()
            .push((id, channel.clone()));
        Ok(id)
    }

    async fn delete_channel(&self, channel_id: u64) -> Result<(), PlatformError> {
        if let Some(err) = self
            .state
            .take_failure(&format!("delete_channel:{channel_id}"), "delete_channel")
        {
            return Err(err);
        }

        self.state.deleted_channels.lock().push(channel_id);
        Ok(())
    }

    async fn create_emoji(
        &self,
        _guild_id: u64,
        name: &str,
        image_data_uri: &str,
    ) -> Result<u64, PlatformError> {
        if let Some(err) = self
            .state
            .take_failure(&format!("create_emoji:{name}"), "create_emoji")
        {
            return Err(err);
        }

        self.state
            .created_emojis
            .lock()
            .push((name.to_string(), image_data_uri.to_string()));
        Ok(self.state.next_id())
    }

    async fn update_guild(
        &self,
        guild_id: u64,
        update: &GuildUpdate,
    ) -> Result<(), PlatformError> {
        if let Some(err) = self.state.take_failure("update_guild", "update_guild") {
            return Err(err);
        }

        self.state
            .guild_updates
            .lock()
            .push((guild_id, update.clone()));
        Ok(())
    }

    async fn destroy(&self) {
        self.state.destroys.fetch_add(1, Ordering::AcqRel);
    }
}

/// Scripted image source recording every fetch attempt.
#[derive(Default)]
pub struct MockImageSource {
    images: Mutex<HashMap<String, String>>,
    failures: Mutex<HashMap<String, VecDeque<PlatformError>>>,
    pub fetches: Mutex<Vec<String>>,
}

impl MockImageSource {
    pub fn add_image(&self, url: &str, data_uri: &str) {
        self.images
            .lock()
            .insert(url.to_string(), data_uri.to_string());
    }

    pub fn fail_url(&self, url: &str, err: PlatformError) {
        self.failures
            .lock()
            .entry(url.to_string())
            .or_default()
            .push_back(err);
    }
}

#[async_trait]
impl ImageSource for MockImageSource {
    async fn fetch_data_uri(&self, url: &str) -> Result<String, PlatformError> {
        self.fetches.lock().push(url.to_string());

        if let Some(queue) = self.failures.lock().get_mut(url) {
            if let Some(err) = queue.pop_front() {
                return Err(err);
            }
        }

        Ok(self
            .images
            .lock()
            .get(url)
            .cloned()
            .unwrap_or_else(|| "data:image/png;base64,QUFBQQ==".to_string()))
    }
}

/// Progress sink collecting every line for assertions.
#[derive(Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|line| line.contains(needle))
    }
}

#[async_trait]
impl ProgressSink for RecordingSink {
    async fn send(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}
