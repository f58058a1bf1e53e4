//! The clone orchestrator.
//!
//! One `ServerCloner` drives one clone run at a time through a fixed phase
//! sequence: delete the target's existing content, then recreate roles,
//! categories, channels, optionally emojis, and finally the server identity.
//! Roles come first because every later permission overwrite is translated
//! through the role mapping built in that phase; categories come before
//! channels because child channels resolve their parent against the freshly
//! created categories.
//!
//! Individual item failures are counted and tolerated; only precondition
//! violations and whole-phase enumeration failures abort the run. All phase
//! work is sequential. The only concurrent actor is the staleness monitor,
//! which may swap the live session out from under an in-flight operation;
//! that operation then fails fast and the retry layer picks up the new
//! session on the next attempt.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::cloner::connection::ConnectionManager;
use crate::cloner::overwrite::{translate_overwrites, RoleMapping};
use crate::cloner::phase::ClonePhase;
use crate::cloner::progress::ProgressReporter;
use crate::cloner::retry::{Retrier, RetryPolicy};
use crate::cloner::stats::{CloneStats, StatsSnapshot};
use crate::error::clone::CloneError;
use crate::net::image::ImageSource;
use crate::platform::error::PlatformError;
use crate::platform::types::{
    ChannelInfo, ChannelKind, GuildProfile, GuildUpdate, NewChannel, NewRole, OverwriteInfo,
};
use crate::platform::{PlatformConnector, PlatformSession};

const DEFAULT_OPERATION_DELAY: Duration = Duration::from_millis(200);
const DEFAULT_EMOJI_DELAY: Duration = Duration::from_millis(2_000);

/// Tunables for a clone run.
#[derive(Debug, Clone)]
pub struct CloneSettings {
    /// Courtesy delay between consecutive mutations.
    pub operation_delay: Duration,
    /// Longer delay between emoji mutations.
    pub emoji_delay: Duration,
    pub retry: RetryPolicy,
}

impl Default for CloneSettings {
    fn default() -> Self {
        Self {
            operation_delay: DEFAULT_OPERATION_DELAY,
            emoji_delay: DEFAULT_EMOJI_DELAY,
            retry: RetryPolicy::default(),
        }
    }
}

/// Per-run options chosen by the caller.
#[derive(Debug, Clone)]
pub struct CloneOptions {
    pub clone_emojis: bool,
}

impl Default for CloneOptions {
    fn default() -> Self {
        Self { clone_emojis: true }
    }
}

/// Sequences the phases of a server clone.
pub struct ServerCloner<C: PlatformConnector> {
    connection: Arc<ConnectionManager<C>>,
    retrier: Retrier<C>,
    images: Arc<dyn ImageSource>,
    reporter: ProgressReporter,
    settings: CloneSettings,
    stats: Arc<CloneStats>,
    phase: Mutex<ClonePhase>,
    active: AtomicBool,
}

impl<C: PlatformConnector> ServerCloner<C> {
    pub fn new(
        connection: Arc<ConnectionManager<C>>,
        images: Arc<dyn ImageSource>,
        reporter: ProgressReporter,
        settings: CloneSettings,
    ) -> Self {
        let stats = Arc::new(CloneStats::new());
        let retrier = Retrier::new(
            Arc::clone(&connection),
            Arc::clone(&stats),
            settings.retry.clone(),
        );

        Self {
            connection,
            retrier,
            images,
            reporter,
            settings,
            stats,
            phase: Mutex::new(ClonePhase::Idle),
            active: AtomicBool::new(false),
        }
    }

    pub fn phase(&self) -> ClonePhase {
        *self.phase.lock()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Clones `source_id` into `target_id`, deleting the target's existing
    /// content first.
    ///
    /// Only one run may be active per orchestrator; a second call while one
    /// is in flight is refused. The staleness monitor is started for the
    /// duration of the run and stopped on every exit path.
    ///
    /// # Returns
    /// - `Ok(StatsSnapshot)` - The run finished; per-item failures, if any,
    ///   are visible in the counters
    /// - `Err(CloneError)` - A precondition failed or a whole-phase call
    ///   could not be recovered
    pub async fn clone_server(
        &self,
        source_id: u64,
        target_id: u64,
        options: &CloneOptions,
    ) -> Result<StatsSnapshot, CloneError> {
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CloneError::AlreadyRunning);
        }

        self.stats.reset();
        self.advance(ClonePhase::Idle);

        let monitor = {
            let stats = Arc::clone(&self.stats);
            let reporter = self.reporter.clone();

            self.connection.start_monitoring(move || {
                stats.record_reconnect();
                let reporter = reporter.clone();
                tokio::spawn(async move {
                    reporter.send("🔄 Auto-reconnected to improve speed").await;
                });
            })
        };

        let result = self.run(source_id, target_id, options).await;

        if let Err(err) = &result {
            self.report(&format!("❌ Clone failed: {err}")).await;
            self.advance(ClonePhase::Failed);
        }

        monitor.stop();
        self.active.store(false, Ordering::Release);

        result.map(|()| self.stats.snapshot())
    }

    async fn run(
        &self,
        source_id: u64,
        target_id: u64,
        options: &CloneOptions,
    ) -> Result<(), CloneError> {
        let session = self.connection.session().await;

        let source = session
            .guild_profile(source_id)
            .await
            .map_err(|err| match err {
                PlatformError::NotFound(_) => CloneError::SourceNotFound,
                other => CloneError::Platform(other),
            })?;
        let target = session
            .guild_profile(target_id)
            .await
            .map_err(|err| match err {
                PlatformError::NotFound(_) => CloneError::TargetNotFound,
                other => CloneError::Platform(other),
            })?;
        drop(session);

        self.report(&format!("🚀 Starting clone: {} → {}", source.name, target.name))
            .await;
        self.report("⏳ This may take several minutes...").await;

        self.delete_existing(target_id).await?;

        let mapping = self.clone_roles(source_id, target_id).await?;
        self.reorder_roles(source_id, target_id, &mapping).await;

        let categories = self.clone_categories(source_id, target_id, &mapping).await?;
        self.clone_channels(source_id, target_id, &mapping, &categories)
            .await?;

        if options.clone_emojis {
            self.clone_emojis(source_id, target_id).await?;
        }

        self.update_settings(&source, target_id).await;

        self.advance(ClonePhase::Done);
        self.report(&self.stats.snapshot().summary()).await;
        self.report("🎉 Server cloned successfully!").await;

        Ok(())
    }

    /// Deletes the target's existing channels, then its deletable roles.
    /// Every deletion failure is counted and skipped; the phase never aborts
    /// over a single item.
    async fn delete_existing(&self, target_id: u64) -> Result<(), CloneError> {
        self.advance(ClonePhase::Deleting);
        self.report("🗑️ Deleting existing channels and roles...").await;

        let session = self.connection.session().await;
        let channels = session.channels(target_id).await?;
        for channel in &channels {
            let result = self
                .retrier
                .execute(&format!("Delete channel {}", channel.name), || async {
                    self.connection
                        .session()
                        .await
                        .delete_channel(channel.channel_id)
                        .await
                })
                .await;
            if result.is_err() {
                self.stats.record_failure();
            }
            self.pause().await;
        }

        let roles = session.roles(target_id).await?;
        for role in roles.iter().filter(|r| !r.is_default && !r.managed) {
            let result = self
                .retrier
                .execute(&format!("Delete role {}", role.name), || async {
                    self.connection
                        .session()
                        .await
                        .delete_role(target_id, role.role_id)
                        .await
                })
                .await;
            if result.is_err() {
                self.stats.record_failure();
            }
            self.pause().await;
        }

        self.report("✅ Cleanup completed").await;
        Ok(())
    }

    /// Recreates the source's roles in hierarchy order (lowest position
    /// first) and builds the mapping later phases translate overwrites with.
    async fn clone_roles(
        &self,
        source_id: u64,
        target_id: u64,
    ) -> Result<RoleMapping, CloneError> {
        self.advance(ClonePhase::CloningRoles);
        self.report("👑 Cloning roles...").await;

        let mut roles: Vec<_> = self
            .connection
            .session()
            .await
            .roles(source_id)
            .await?
            .into_iter()
            .filter(|role| !role.is_default)
            .collect();
        roles.sort_by_key(|role| role.position);

        let mut mapping = RoleMapping::new();
        for role in &roles {
            let new_role = NewRole {
                name: role.name.clone(),
                color: role.color,
                permissions: role.permissions,
                hoist: role.hoist,
                mentionable: role.mentionable,
            };

            let result = self
                .retrier
                .execute(&format!("Create role {}", role.name), || async {
                    self.connection
                        .session()
                        .await
                        .create_role(target_id, &new_role)
                        .await
                })
                .await;

            match result {
                Ok(new_id) => {
                    mapping.insert(role.role_id, new_id);
                    self.stats.record_role();
                }
                Err(err) => {
                    self.report(&format!("⚠️ Failed role {}: {err}", role.name))
                        .await;
                    self.stats.record_failure();
                }
            }
            self.pause().await;
        }

        self.report(&format!(
            "✅ Created {} roles",
            self.stats.snapshot().roles_created
        ))
        .await;

        Ok(mapping)
    }

    /// Best-effort second pass mirroring the source's role ordering onto the
    /// target. Position failures are cosmetic and swallowed.
    async fn reorder_roles(&self, source_id: u64, target_id: u64, mapping: &RoleMapping) {
        let Ok(roles) = self.connection.session().await.roles(source_id).await else {
            return;
        };

        for role in roles.iter().filter(|r| !r.is_default) {
            let Some(new_id) = mapping.get(&role.role_id) else {
                continue;
            };

            let session = self.connection.session().await;
            if let Err(err) = session
                .set_role_position(target_id, *new_id, role.position)
                .await
            {
                tracing::debug!("Could not position role {}: {err}", role.name);
            }
        }
    }

    /// Recreates the source's categories in position order, translating each
    /// one's overwrites. Returns created category ids keyed by name, which
    /// the channel phase uses to resolve parents. When the source has
    /// duplicate category names the first created one wins, matching the
    /// source tool's lookup behavior.
    async fn clone_categories(
        &self,
        source_id: u64,
        target_id: u64,
        mapping: &RoleMapping,
    ) -> Result<HashMap<String, u64>, CloneError> {
        self.advance(ClonePhase::CloningCategories);
        self.report("📁 Cloning categories...").await;

        let mut categories: Vec<_> = self
            .connection
            .session()
            .await
            .channels(source_id)
            .await?
            .into_iter()
            .filter(|channel| channel.kind == ChannelKind::Category)
            .collect();
        categories.sort_by_key(|category| category.position);

        let mut created = HashMap::new();
        for category in &categories {
            let new_channel = NewChannel {
                name: category.name.clone(),
                kind: ChannelKind::Category,
                position: category.position,
                parent_id: None,
                topic: None,
                nsfw: false,
                slowmode_secs: None,
                bitrate: None,
                user_limit: None,
                overwrites: translate_overwrites(&category.overwrites, mapping),
            };

            let result = self
                .retrier
                .execute(&format!("Create category {}", category.name), || async {
                    self.connection
                        .session()
                        .await
                        .create_channel(target_id, &new_channel)
                        .await
                })
                .await;

            match result {
                Ok(new_id) => {
                    created.entry(category.name.clone()).or_insert(new_id);
                    self.stats.record_category();
                }
                Err(err) => {
                    self.report(&format!("⚠️ Failed category {}: {err}", category.name))
                        .await;
                    self.stats.record_failure();
                }
            }
            self.pause().await;
        }

        self.report(&format!(
            "✅ Created {} categories",
            self.stats.snapshot().categories_created
        ))
        .await;

        Ok(created)
    }

    /// Recreates the source's text and voice channels in position order,
    /// resolving each channel's parent category by name among the categories
    /// created in the previous phase.
    async fn clone_channels(
        &self,
        source_id: u64,
        target_id: u64,
        mapping: &RoleMapping,
        created_categories: &HashMap<String, u64>,
    ) -> Result<(), CloneError> {
        self.advance(ClonePhase::CloningChannels);
        self.report("💬 Cloning channels...").await;

        let all = self.connection.session().await.channels(source_id).await?;

        let category_names: HashMap<u64, &str> = all
            .iter()
            .filter(|channel| channel.kind == ChannelKind::Category)
            .map(|channel| (channel.channel_id, channel.name.as_str()))
            .collect();

        let mut channels: Vec<_> = all
            .iter()
            .filter(|channel| {
                matches!(channel.kind, ChannelKind::Text | ChannelKind::Voice)
            })
            .collect();
        channels.sort_by_key(|channel| channel.position);

        for channel in channels {
            let parent_id = channel
                .parent_id
                .and_then(|source_parent| category_names.get(&source_parent))
                .and_then(|name| created_categories.get(*name))
                .copied();

            let overwrites = translate_overwrites(&channel.overwrites, mapping);
            let new_channel = channel_params(channel, parent_id, overwrites);

            let result = self
                .retrier
                .execute(&format!("Create channel {}", channel.name), || async {
                    self.connection
                        .session()
                        .await
                        .create_channel(target_id, &new_channel)
                        .await
                })
                .await;

            match result {
                Ok(_) => self.stats.record_channel(),
                Err(err) => {
                    self.report(&format!("⚠️ Failed channel {}: {err}", channel.name))
                        .await;
                    self.stats.record_failure();
                }
            }
            self.pause().await;
        }

        self.report(&format!(
            "✅ Created {} channels",
            self.stats.snapshot().channels_created
        ))
        .await;

        Ok(())
    }

    /// Recreates the source's emojis from their fetched images. Emojis with
    /// no retrievable image URL are counted as failed without attempting a
    /// fetch. Uses the longer emoji delay between items.
    async fn clone_emojis(&self, source_id: u64, target_id: u64) -> Result<(), CloneError> {
        self.advance(ClonePhase::CloningEmojis);
        self.report("😀 Cloning emojis...").await;

        let emojis = self.connection.session().await.emojis(source_id).await?;

        for emoji in &emojis {
            let Some(url) = &emoji.image_url else {
                self.stats.record_failure();
                continue;
            };

            let result = self
                .retrier
                .execute(&format!("Create emoji {}", emoji.name), || async {
                    let image = self.images.fetch_data_uri(url).await?;
                    self.connection
                        .session()
                        .await
                        .create_emoji(target_id, &emoji.name, &image)
                        .await
                })
                .await;

            match result {
                Ok(_) => self.stats.record_emoji(),
                Err(err) => {
                    self.report(&format!("⚠️ Failed emoji {}: {err}", emoji.name))
                        .await;
                    self.stats.record_failure();
                }
            }
            tokio::time::sleep(self.settings.emoji_delay).await;
        }

        self.report(&format!(
            "✅ Created {} emojis",
            self.stats.snapshot().emojis_created
        ))
        .await;

        Ok(())
    }

    /// Copies the source's name and, when fetchable, its icon onto the
    /// target. Best-effort: a failure here is counted but never aborts the
    /// run, since this is the last phase before the summary.
    async fn update_settings(&self, source: &GuildProfile, target_id: u64) {
        self.advance(ClonePhase::UpdatingSettings);
        self.report("⚙️ Cloning server settings...").await;

        let mut icon = None;
        if let Some(url) = &source.icon_url {
            match self.images.fetch_data_uri(url).await {
                Ok(data_uri) => icon = Some(data_uri),
                Err(err) => {
                    tracing::debug!("Icon fetch failed: {err}");
                    self.report("⚠️ Could not download server icon").await;
                }
            }
        }

        let update = GuildUpdate {
            name: source.name.clone(),
            icon,
        };

        let result = self
            .retrier
            .execute("Update server settings", || async {
                self.connection
                    .session()
                    .await
                    .update_guild(target_id, &update)
                    .await
            })
            .await;

        match result {
            Ok(()) => {
                self.report(&format!("✅ Updated server name: {}", source.name))
                    .await;
                if update.icon.is_some() {
                    self.report("✅ Updated server icon").await;
                }
            }
            Err(err) => {
                self.report(&format!("⚠️ Failed server settings: {err}")).await;
                self.stats.record_failure();
            }
        }
    }

    /// Emits a progress line through every sink. Counts as activity so the
    /// staleness monitor sees the run moving even between platform calls.
    async fn report(&self, line: &str) {
        self.connection.activity().touch();
        self.reporter.send(line).await;
    }

    fn advance(&self, next: ClonePhase) {
        tracing::debug!("Phase: {next}");
        *self.phase.lock() = next;
    }

    async fn pause(&self) {
        tokio::time::sleep(self.settings.operation_delay).await;
    }
}

/// Builds the creation parameters for a text or voice channel, copying only
/// the fields that apply to its kind.
fn channel_params(
    channel: &ChannelInfo,
    parent_id: Option<u64>,
    overwrites: Vec<OverwriteInfo>,
) -> NewChannel {
    let mut new_channel = NewChannel {
        name: channel.name.clone(),
        kind: channel.kind,
        position: channel.position,
        parent_id,
        topic: None,
        nsfw: false,
        slowmode_secs: None,
        bitrate: None,
        user_limit: None,
        overwrites,
    };

    match channel.kind {
        ChannelKind::Text => {
            new_channel.topic = channel.topic.clone();
            new_channel.nsfw = channel.nsfw;
            new_channel.slowmode_secs = channel.slowmode_secs;
        }
        ChannelKind::Voice => {
            new_channel.bitrate = channel.bitrate;
            new_channel.user_limit = channel.user_limit;
        }
        ChannelKind::Category | ChannelKind::Other => {}
    }

    new_channel
}
