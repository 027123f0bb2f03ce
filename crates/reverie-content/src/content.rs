use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use reverie_store::{Collection, RemoteStore, StoreError, mapper};
use reverie_types::forms::{
    AnnouncementForm, DreamerForm, EventForm, QuestForm, RoleForm, SponsorForm, StudentForm,
};
use reverie_types::models::{
    AcademyStudent, Announcement, Donation, Dreamer, Event, Quest, Role, Sponsor, SponsorshipGoal,
};

use crate::sponsorships::derive_sponsorships;

/// The announcement table is a singleton; edits always land on this row.
pub const ANNOUNCEMENT_ID: &str = "current";

/// Full in-memory copy of all collections, always fully mapped to
/// application shape. Replaced wholesale behind an `Arc` — readers never
/// observe a half-refreshed mixture.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub quests: Vec<Quest>,
    pub roles: Vec<Role>,
    pub dreamers: Vec<Dreamer>,
    pub sponsors: Vec<Sponsor>,
    pub events: Vec<Event>,
    pub announcement: Option<Announcement>,
    pub donations: Vec<Donation>,
    pub students: Vec<AcademyStudent>,
    /// Derived: quests/events with a nonzero funding target.
    pub sponsorships: Vec<SponsorshipGoal>,
}

/// What a single `refresh` pass did.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshReport {
    pub seq: u64,
    /// False when a newer refresh finished first and this result was
    /// discarded as stale.
    pub installed: bool,
    #[serde(serialize_with = "collection_names")]
    pub failed: Vec<Collection>,
}

fn collection_names<S: serde::Serializer>(
    failed: &[Collection],
    s: S,
) -> Result<S::Ok, S::Error> {
    s.collect_seq(failed.iter().map(Collection::table))
}

struct State {
    snapshot: Arc<Snapshot>,
    loading: bool,
    installed_seq: u64,
}

/// Process-wide cache of all application records. The remote store is the
/// system of record; this is a read-mostly replica with no local
/// write-ahead — every mutation goes remote first, then refetches.
pub struct ContentStore {
    store: Arc<dyn RemoteStore>,
    state: RwLock<State>,
    refresh_seq: AtomicU64,
}

impl ContentStore {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            state: RwLock::new(State {
                snapshot: Arc::new(Snapshot::default()),
                loading: true,
                installed_seq: 0,
            }),
            refresh_seq: AtomicU64::new(0),
        }
    }

    pub fn remote(&self) -> Arc<dyn RemoteStore> {
        Arc::clone(&self.store)
    }

    pub async fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.state.read().await.snapshot)
    }

    pub async fn loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// Refetch every collection concurrently and install a fresh snapshot.
    ///
    /// A collection whose fetch fails keeps its previous data while the
    /// others update; the failure is logged and reported, never fatal.
    /// Each refresh carries a sequence number and a result older than the
    /// installed snapshot is discarded, so overlapping refreshes cannot
    /// roll the cache backwards.
    pub async fn refresh(&self) -> RefreshReport {
        let seq = self.refresh_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().await.loading = true;

        let prev = self.snapshot().await;
        let mut failed = Vec::new();

        let (quests, roles, dreamers, sponsors, events, announcements, donations, students) = tokio::join!(
            self.store.list(Collection::Quests),
            self.store.list(Collection::Roles),
            self.store.list(Collection::Dreamers),
            self.store.list(Collection::Sponsors),
            self.store.list(Collection::Events),
            self.store.list(Collection::Announcements),
            self.store.list(Collection::Donations),
            self.store.list(Collection::AcademyStudents),
        );

        let quests = keep_on_failure(
            quests, mapper::quest_to_application, &prev.quests, Collection::Quests, &mut failed,
        );
        let roles = keep_on_failure(
            roles, mapper::role_to_application, &prev.roles, Collection::Roles, &mut failed,
        );
        let dreamers = keep_on_failure(
            dreamers,
            mapper::dreamer_to_application,
            &prev.dreamers,
            Collection::Dreamers,
            &mut failed,
        );
        let sponsors = keep_on_failure(
            sponsors,
            mapper::sponsor_to_application,
            &prev.sponsors,
            Collection::Sponsors,
            &mut failed,
        );
        let events = keep_on_failure(
            events, mapper::event_to_application, &prev.events, Collection::Events, &mut failed,
        );
        let donations = keep_on_failure(
            donations,
            mapper::donation_to_application,
            &prev.donations,
            Collection::Donations,
            &mut failed,
        );
        let students = keep_on_failure(
            students,
            mapper::student_to_application,
            &prev.students,
            Collection::AcademyStudents,
            &mut failed,
        );
        let announcement = match announcements {
            Ok(rows) => rows.first().map(mapper::announcement_to_application),
            Err(e) => {
                warn!("refresh kept last announcement: {}", e);
                failed.push(Collection::Announcements);
                prev.announcement.clone()
            }
        };

        let sponsorships = derive_sponsorships(&quests, &events);

        let snapshot = Snapshot {
            quests,
            roles,
            dreamers,
            sponsors,
            events,
            announcement,
            donations,
            students,
            sponsorships,
        };

        let mut state = self.state.write().await;
        let installed = seq > state.installed_seq;
        if installed {
            state.snapshot = Arc::new(snapshot);
            state.installed_seq = seq;
        } else {
            info!("refresh #{} discarded, #{} already installed", seq, state.installed_seq);
        }
        state.loading = false;

        RefreshReport { seq, installed, failed }
    }

    // -- Mutations --
    //
    // Every action writes remotely first, then refetches. A StoreError
    // leaves the snapshot untouched (no refresh, no partial state).

    async fn save(&self, collection: Collection, row: Value) -> Result<(), StoreError> {
        self.store.upsert(collection, row).await?;
        self.refresh().await;
        Ok(())
    }

    async fn remove(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        self.store.delete(collection, id).await?;
        self.refresh().await;
        Ok(())
    }

    // -- Quests --

    pub async fn add_quest(&self, form: &QuestForm) -> Result<Quest, StoreError> {
        let quest = mapper::quest_from_form(Uuid::new_v4().to_string(), form);
        self.save(Collection::Quests, mapper::quest_to_storage(&quest)).await?;
        Ok(quest)
    }

    pub async fn update_quest(&self, id: &str, form: &QuestForm) -> Result<Quest, StoreError> {
        let quest = mapper::quest_from_form(id.to_string(), form);
        self.save(Collection::Quests, mapper::quest_to_storage(&quest)).await?;
        Ok(quest)
    }

    pub async fn delete_quest(&self, id: &str) -> Result<(), StoreError> {
        self.remove(Collection::Quests, id).await
    }

    // -- Roles --

    pub async fn add_role(&self, form: &RoleForm) -> Result<Role, StoreError> {
        let role = mapper::role_from_form(Uuid::new_v4().to_string(), form);
        self.save(Collection::Roles, mapper::role_to_storage(&role)).await?;
        Ok(role)
    }

    pub async fn update_role(&self, id: &str, form: &RoleForm) -> Result<Role, StoreError> {
        let role = mapper::role_from_form(id.to_string(), form);
        self.save(Collection::Roles, mapper::role_to_storage(&role)).await?;
        Ok(role)
    }

    pub async fn delete_role(&self, id: &str) -> Result<(), StoreError> {
        self.remove(Collection::Roles, id).await
    }

    // -- Dreamers --

    pub async fn add_dreamer(&self, form: &DreamerForm) -> Result<Dreamer, StoreError> {
        let dreamer = mapper::dreamer_from_form(Uuid::new_v4().to_string(), form);
        self.save(Collection::Dreamers, mapper::dreamer_to_storage(&dreamer)).await?;
        Ok(dreamer)
    }

    pub async fn update_dreamer(&self, id: &str, form: &DreamerForm) -> Result<Dreamer, StoreError> {
        let dreamer = mapper::dreamer_from_form(id.to_string(), form);
        self.save(Collection::Dreamers, mapper::dreamer_to_storage(&dreamer)).await?;
        Ok(dreamer)
    }

    pub async fn delete_dreamer(&self, id: &str) -> Result<(), StoreError> {
        self.remove(Collection::Dreamers, id).await
    }

    // -- Sponsors --

    pub async fn add_sponsor(&self, form: &SponsorForm) -> Result<Sponsor, StoreError> {
        let sponsor = mapper::sponsor_from_form(Uuid::new_v4().to_string(), form);
        self.save(Collection::Sponsors, mapper::sponsor_to_storage(&sponsor)).await?;
        Ok(sponsor)
    }

    pub async fn update_sponsor(&self, id: &str, form: &SponsorForm) -> Result<Sponsor, StoreError> {
        let sponsor = mapper::sponsor_from_form(id.to_string(), form);
        self.save(Collection::Sponsors, mapper::sponsor_to_storage(&sponsor)).await?;
        Ok(sponsor)
    }

    pub async fn delete_sponsor(&self, id: &str) -> Result<(), StoreError> {
        self.remove(Collection::Sponsors, id).await
    }

    // -- Events --

    pub async fn add_event(&self, form: &EventForm) -> Result<Event, StoreError> {
        let event = mapper::event_from_form(Uuid::new_v4().to_string(), form);
        self.save(Collection::Events, mapper::event_to_storage(&event)).await?;
        Ok(event)
    }

    pub async fn update_event(&self, id: &str, form: &EventForm) -> Result<Event, StoreError> {
        let event = mapper::event_from_form(id.to_string(), form);
        self.save(Collection::Events, mapper::event_to_storage(&event)).await?;
        Ok(event)
    }

    pub async fn delete_event(&self, id: &str) -> Result<(), StoreError> {
        self.remove(Collection::Events, id).await
    }

    // -- Academy students --

    pub async fn add_student(&self, form: &StudentForm) -> Result<AcademyStudent, StoreError> {
        let student = mapper::student_from_form(Uuid::new_v4().to_string(), form);
        self.save(Collection::AcademyStudents, mapper::student_to_storage(&student)).await?;
        Ok(student)
    }

    pub async fn delete_student(&self, id: &str) -> Result<(), StoreError> {
        self.remove(Collection::AcademyStudents, id).await
    }

    // -- Announcement --

    pub async fn update_announcement(&self, form: &AnnouncementForm) -> Result<(), StoreError> {
        self.save(
            Collection::Announcements,
            mapper::announcement_to_storage(ANNOUNCEMENT_ID, form),
        )
        .await
    }
}

fn keep_on_failure<T: Clone>(
    result: Result<Vec<Value>, StoreError>,
    map: impl Fn(&Value) -> T,
    prev: &[T],
    collection: Collection,
    failed: &mut Vec<Collection>,
) -> Vec<T> {
    match result {
        Ok(rows) => rows.iter().map(map).collect(),
        Err(e) => {
            warn!("refresh kept last snapshot of '{}': {}", collection, e);
            failed.push(collection);
            prev.to_vec()
        }
    }
}
