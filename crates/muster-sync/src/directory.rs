//! [`DirectoryStore`]: fetch and mutate operations for the five
//! collections.

use std::{
  collections::{BTreeMap, BTreeSet},
  sync::Arc,
};

use muster_core::{
  Id,
  entity::{Cascade, Entity},
  model::{
    Band, Commission, District, Group, Member, NewBand, NewCommission,
    NewDistrict, NewGroup, NewMember, to_row,
  },
  patch::{BandPatch, CommissionPatch, DistrictPatch, GroupPatch, MemberPatch, payload},
  store::{Filter, Row, Table, TableStore},
};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::{
  Error, Result,
  decode::Record,
  membership::{MembershipDiff, group_links, link_rows, links_query},
  status::{Status, StatusBoard},
  view::Snapshot,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Process-wide holder of the directory collections.
///
/// Every write is followed by a reload of the collections it may have
/// changed; which ones is decided by the [`Cascade`] policy. Writes are never
/// applied to the local collections directly.
pub struct DirectoryStore<S> {
  tables:  S,
  cascade: Cascade,
  data:    RwLock<Snapshot>,
  status:  StatusBoard,
}

impl<S: TableStore> DirectoryStore<S> {
  /// An empty directory over `tables`, using the default (transitive)
  /// cascade policy. Nothing is fetched until asked.
  pub fn new(tables: S) -> Self {
    Self {
      tables,
      cascade: Cascade::default(),
      data: RwLock::new(Snapshot::default()),
      status: StatusBoard::default(),
    }
  }

  pub fn with_cascade(mut self, cascade: Cascade) -> Self {
    self.cascade = cascade;
    self
  }

  pub fn cascade(&self) -> Cascade { self.cascade }

  /// The backing table store.
  pub fn tables(&self) -> &S { &self.tables }

  // ── Reads ─────────────────────────────────────────────────────────────────

  pub async fn snapshot(&self) -> Snapshot { self.data.read().await.clone() }

  pub async fn commissions(&self) -> Arc<Vec<Commission>> {
    self.data.read().await.commissions.clone()
  }

  pub async fn districts(&self) -> Arc<Vec<District>> {
    self.data.read().await.districts.clone()
  }

  pub async fn groups(&self) -> Arc<Vec<Group>> { self.data.read().await.groups.clone() }

  pub async fn bands(&self) -> Arc<Vec<Band>> { self.data.read().await.bands.clone() }

  pub async fn members(&self) -> Arc<Vec<Member>> {
    self.data.read().await.members.clone()
  }

  // ── Status ────────────────────────────────────────────────────────────────

  pub fn status(&self, entity: Entity) -> Status { self.status.get(entity) }

  pub fn statuses(&self) -> BTreeMap<Entity, Status> { self.status.all() }

  /// The first recorded error, in hierarchy order.
  pub fn error(&self) -> Option<String> {
    self.status.all().into_values().find_map(|s| s.error)
  }

  pub fn is_loading(&self) -> bool { self.status.all().values().any(|s| s.loading) }

  /// Record the outcome of an operation on `entity` in its status slot.
  fn settle<T>(&self, entity: Entity, result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
      tracing::warn!(%entity, error = %err, "directory operation failed");
      self.status.fail(entity, err.to_string());
    }
    result
  }

  // ── Fetch ─────────────────────────────────────────────────────────────────

  /// Reload one collection, replacing it wholesale. On failure the previous
  /// contents are kept and the error is recorded.
  pub async fn fetch(&self, entity: Entity) -> Result<()> {
    match entity {
      Entity::Commission => self.fetch_records::<Commission>().await,
      Entity::District => self.fetch_records::<District>().await,
      Entity::Group => self.fetch_records::<Group>().await,
      Entity::Band => self.fetch_records::<Band>().await,
      Entity::Member => self.fetch_member_records().await,
    }
  }

  pub async fn fetch_commissions(&self) -> Result<()> { self.fetch(Entity::Commission).await }

  pub async fn fetch_districts(&self) -> Result<()> { self.fetch(Entity::District).await }

  pub async fn fetch_groups(&self) -> Result<()> { self.fetch(Entity::Group).await }

  pub async fn fetch_bands(&self) -> Result<()> { self.fetch(Entity::Band).await }

  pub async fn fetch_members(&self) -> Result<()> { self.fetch(Entity::Member).await }

  /// Reload all five collections concurrently. Each one succeeds or fails
  /// on its own; the first error in hierarchy order is returned.
  pub async fn fetch_all(&self) -> Result<()> {
    let (commissions, districts, groups, bands, members) = tokio::join!(
      self.fetch_commissions(),
      self.fetch_districts(),
      self.fetch_groups(),
      self.fetch_bands(),
      self.fetch_members(),
    );
    commissions.and(districts).and(groups).and(bands).and(members)
  }

  async fn read<R: Record>(&self) -> Result<Vec<R>> {
    let rows = self
      .tables
      .select(&R::query())
      .await
      .map_err(Error::remote)?;
    rows.into_iter().map(R::decode).collect()
  }

  async fn replace<R: Record>(&self, records: Vec<R>) {
    tracing::debug!(entity = %R::ENTITY, count = records.len(), "collection replaced");
    let mut data = self.data.write().await;
    *R::collection(&mut data) = Arc::new(records);
  }

  async fn fetch_records<R: Record>(&self) -> Result<()> {
    let _loading = self.status.begin(R::ENTITY);
    let records = self.settle(R::ENTITY, self.read::<R>().await)?;
    self.replace(records).await;
    Ok(())
  }

  /// Members need two reads: the member rows, then every association row,
  /// merged in memory.
  async fn fetch_member_records(&self) -> Result<()> {
    let _loading = self.status.begin(Entity::Member);
    let members = self.settle(Entity::Member, self.read_members().await)?;
    self.replace(members).await;
    Ok(())
  }

  async fn read_members(&self) -> Result<Vec<Member>> {
    let mut members = self.read::<Member>().await?;
    let links = self
      .tables
      .select(&links_query())
      .await
      .map_err(Error::remote)?;
    let mut by_member = group_links(links)?;
    for member in &mut members {
      member.band_ids = by_member.remove(&member.id).unwrap_or_default();
    }
    Ok(members)
  }

  /// Reload `entities` one after another. A failing reload does not stop the
  /// ones after it; the first error is returned.
  async fn refresh(&self, entities: &[Entity]) -> Result<()> {
    let mut first = None;
    for entity in entities {
      tracing::debug!(%entity, "refresh");
      if let Err(err) = self.fetch(*entity).await {
        first.get_or_insert(err);
      }
    }
    first.map_or(Ok(()), Err)
  }

  // ── Generic writes ────────────────────────────────────────────────────────

  fn encoded(entity: Entity, row: muster_core::Result<Row>) -> Result<Row> {
    row.map_err(|e| Error::Encode {
      entity,
      message: e.to_string(),
    })
  }

  /// Insert one row and return the id the store assigned to it.
  async fn insert_one(&self, entity: Entity, row: Row) -> Result<Id> {
    let inserted = self
      .tables
      .insert(entity.table(), vec![row])
      .await
      .map_err(Error::remote)?;
    inserted
      .first()
      .and_then(|r| r.get("id"))
      .and_then(|v| v.as_str())
      .and_then(|s| s.parse().ok())
      .ok_or_else(|| Error::Decode {
        entity,
        message: "insert returned no id".into(),
      })
  }

  async fn create<T: Serialize>(&self, entity: Entity, input: &T) -> Result<Id> {
    let _loading = self.status.begin(entity);
    let inserted = async {
      let row = Self::encoded(entity, to_row(input))?;
      self.insert_one(entity, row).await
    }
    .await;
    let id = self.settle(entity, inserted)?;
    self.reload_inserted(entity, id).await
  }

  /// Reload `entity` after inserting `id`. A failed reload still hands back
  /// the id, inside [`Error::Unreloaded`].
  async fn reload_inserted(&self, entity: Entity, id: Id) -> Result<Id> {
    match self.refresh(&[entity]).await {
      Ok(()) => Ok(id),
      Err(err) => {
        tracing::warn!(%entity, %id, error = %err, "inserted row not reloaded");
        Err(Error::Unreloaded {
          entity,
          id,
          message: err.to_string(),
        })
      }
    }
  }

  /// Apply a partial update; an empty payload skips the remote call but
  /// still reloads.
  async fn modify<T: Serialize>(&self, entity: Entity, id: Id, patch: &T) -> Result<()> {
    let _loading = self.status.begin(entity);
    let written = async {
      let fields = Self::encoded(entity, payload(patch))?;
      if fields.is_empty() {
        return Ok(());
      }
      self
        .tables
        .update(entity.table(), fields, &[Filter::id(id)])
        .await
        .map_err(Error::remote)
    }
    .await;
    self.settle(entity, written)?;
    self.refresh(&self.cascade.after_update(entity)).await
  }

  async fn remove(&self, entity: Entity, id: Id) -> Result<()> {
    let _loading = self.status.begin(entity);
    let deleted = self
      .tables
      .delete(entity.table(), &[Filter::id(id)])
      .await
      .map_err(Error::remote);
    self.settle(entity, deleted)?;
    self.refresh(&self.cascade.after_delete(entity)).await
  }

  // ── Commissions ───────────────────────────────────────────────────────────

  pub async fn add_commission(&self, input: NewCommission) -> Result<Id> {
    self.create(Entity::Commission, &input).await
  }

  pub async fn update_commission(&self, id: Id, patch: CommissionPatch) -> Result<()> {
    self.modify(Entity::Commission, id, &patch).await
  }

  pub async fn delete_commission(&self, id: Id) -> Result<()> {
    self.remove(Entity::Commission, id).await
  }

  // ── Districts ─────────────────────────────────────────────────────────────

  pub async fn add_district(&self, input: NewDistrict) -> Result<Id> {
    self.create(Entity::District, &input).await
  }

  pub async fn update_district(&self, id: Id, patch: DistrictPatch) -> Result<()> {
    self.modify(Entity::District, id, &patch).await
  }

  pub async fn delete_district(&self, id: Id) -> Result<()> {
    self.remove(Entity::District, id).await
  }

  // ── Groups ────────────────────────────────────────────────────────────────

  pub async fn add_group(&self, input: NewGroup) -> Result<Id> {
    self.create(Entity::Group, &input).await
  }

  pub async fn update_group(&self, id: Id, patch: GroupPatch) -> Result<()> {
    self.modify(Entity::Group, id, &patch).await
  }

  pub async fn delete_group(&self, id: Id) -> Result<()> { self.remove(Entity::Group, id).await }

  // ── Bands ─────────────────────────────────────────────────────────────────

  pub async fn add_band(&self, input: NewBand) -> Result<Id> {
    self.create(Entity::Band, &input).await
  }

  pub async fn update_band(&self, id: Id, patch: BandPatch) -> Result<()> {
    self.modify(Entity::Band, id, &patch).await
  }

  pub async fn delete_band(&self, id: Id) -> Result<()> { self.remove(Entity::Band, id).await }

  // ── Members ───────────────────────────────────────────────────────────────

  /// Insert the member row, then one association row per distinct band.
  ///
  /// If the association insert fails the member row stays behind without
  /// bands; nothing is rolled back and the collection is not reloaded.
  pub async fn add_member(&self, input: NewMember) -> Result<Id> {
    let entity = Entity::Member;
    let _loading = self.status.begin(entity);

    let written = async {
      let row = Self::encoded(entity, to_row(&input))?;
      let id = self.insert_one(entity, row).await?;
      let bands: BTreeSet<Id> = input.band_ids.iter().copied().collect();
      if !bands.is_empty() {
        self
          .tables
          .insert(Table::BandMember, link_rows(id, &bands))
          .await
          .map_err(Error::remote)?;
      }
      Ok::<_, Error>(id)
    }
    .await;

    let id = self.settle(entity, written)?;
    self.reload_inserted(entity, id).await
  }

  /// Update member fields and, when `patch.band_ids` is set, reconcile the
  /// member's bands to exactly that set.
  ///
  /// A failed field update aborts everything. Once past it, membership is
  /// reconciled and the collections reloaded even if reconciliation failed,
  /// so the console shows what actually got written.
  pub async fn update_member(&self, id: Id, patch: MemberPatch) -> Result<()> {
    let entity = Entity::Member;
    let _loading = self.status.begin(entity);

    let written = async {
      let fields = Self::encoded(entity, payload(&patch))?;
      if !fields.is_empty() {
        self
          .tables
          .update(Table::Member, fields, &[Filter::id(id)])
          .await
          .map_err(Error::remote)?;
      }
      Ok::<_, Error>(())
    }
    .await;
    self.settle(entity, written)?;

    let reconciled = match patch.band_ids {
      Some(bands) => self.reconcile_bands(id, bands.into_iter().collect()).await,
      None => Ok(()),
    };

    let refreshed = self.refresh(&self.cascade.after_update(entity)).await;
    self.settle(entity, reconciled.and(refreshed))
  }

  /// Bring the member's association rows in line with `desired`, touching
  /// only the rows that differ. The insert of new bands is attempted even
  /// if removing old ones failed.
  async fn reconcile_bands(&self, member: Id, desired: BTreeSet<Id>) -> Result<()> {
    let current_rows = self
      .tables
      .select(&links_query().filter(Filter::eq("member_id", member.to_string())))
      .await
      .map_err(Error::remote)?;
    let current = group_links(current_rows)?.remove(&member).unwrap_or_default();

    let diff = MembershipDiff::between(&current, &desired);
    tracing::debug!(
      %member,
      added = diff.added.len(),
      removed = diff.removed.len(),
      "reconciling band membership"
    );

    let mut first = None;
    if !diff.removed.is_empty() {
      let filters = [
        Filter::eq("member_id", member.to_string()),
        Filter::any_of("band_id", diff.removed.iter().map(Id::to_string)),
      ];
      if let Err(err) = self.tables.delete(Table::BandMember, &filters).await {
        first.get_or_insert(Error::remote(err));
      }
    }
    if !diff.added.is_empty() {
      let rows = link_rows(member, &diff.added);
      if let Err(err) = self.tables.insert(Table::BandMember, rows).await {
        first.get_or_insert(Error::remote(err));
      }
    }
    first.map_or(Ok(()), Err)
  }

  pub async fn delete_member(&self, id: Id) -> Result<()> {
    self.remove(Entity::Member, id).await
  }
}
