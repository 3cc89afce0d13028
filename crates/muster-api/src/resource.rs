//! The five directory collections as uniform REST resources.

use muster_core::{
  Id,
  entity::Entity,
  model::{
    Band, Commission, District, Group, Member, NewBand, NewCommission, NewDistrict,
    NewGroup, NewMember,
  },
  patch::{BandPatch, CommissionPatch, DistrictPatch, GroupPatch, MemberPatch},
  store::TableStore,
};
use muster_sync::{DirectoryStore, Result, Snapshot, view::Listed};
use serde::{Serialize, de::DeserializeOwned};

/// A record type served under `/<plural>`.
pub trait Resource: Listed + Clone + Serialize + Send + Sync + 'static {
  const ENTITY: Entity;

  type New: DeserializeOwned + Send + 'static;
  type Patch: DeserializeOwned + Send + 'static;

  fn collection(snapshot: &Snapshot) -> &[Self];

  fn id(&self) -> Id;

  fn add<S: TableStore>(
    dir: &DirectoryStore<S>,
    input: Self::New,
  ) -> impl Future<Output = Result<Id>> + Send;

  fn update<S: TableStore>(
    dir: &DirectoryStore<S>,
    id: Id,
    patch: Self::Patch,
  ) -> impl Future<Output = Result<()>> + Send;

  fn delete<S: TableStore>(
    dir: &DirectoryStore<S>,
    id: Id,
  ) -> impl Future<Output = Result<()>> + Send;
}

impl Resource for Commission {
  const ENTITY: Entity = Entity::Commission;

  type New = NewCommission;
  type Patch = CommissionPatch;

  fn collection(snapshot: &Snapshot) -> &[Self] { &snapshot.commissions }

  fn id(&self) -> Id { self.id }

  fn add<S: TableStore>(
    dir: &DirectoryStore<S>,
    input: NewCommission,
  ) -> impl Future<Output = Result<Id>> + Send {
    dir.add_commission(input)
  }

  fn update<S: TableStore>(
    dir: &DirectoryStore<S>,
    id: Id,
    patch: CommissionPatch,
  ) -> impl Future<Output = Result<()>> + Send {
    dir.update_commission(id, patch)
  }

  fn delete<S: TableStore>(
    dir: &DirectoryStore<S>,
    id: Id,
  ) -> impl Future<Output = Result<()>> + Send {
    dir.delete_commission(id)
  }
}

impl Resource for District {
  const ENTITY: Entity = Entity::District;

  type New = NewDistrict;
  type Patch = DistrictPatch;

  fn collection(snapshot: &Snapshot) -> &[Self] { &snapshot.districts }

  fn id(&self) -> Id { self.id }

  fn add<S: TableStore>(
    dir: &DirectoryStore<S>,
    input: NewDistrict,
  ) -> impl Future<Output = Result<Id>> + Send {
    dir.add_district(input)
  }

  fn update<S: TableStore>(
    dir: &DirectoryStore<S>,
    id: Id,
    patch: DistrictPatch,
  ) -> impl Future<Output = Result<()>> + Send {
    dir.update_district(id, patch)
  }

  fn delete<S: TableStore>(
    dir: &DirectoryStore<S>,
    id: Id,
  ) -> impl Future<Output = Result<()>> + Send {
    dir.delete_district(id)
  }
}

impl Resource for Group {
  const ENTITY: Entity = Entity::Group;

  type New = NewGroup;
  type Patch = GroupPatch;

  fn collection(snapshot: &Snapshot) -> &[Self] { &snapshot.groups }

  fn id(&self) -> Id { self.id }

  fn add<S: TableStore>(
    dir: &DirectoryStore<S>,
    input: NewGroup,
  ) -> impl Future<Output = Result<Id>> + Send {
    dir.add_group(input)
  }

  fn update<S: TableStore>(
    dir: &DirectoryStore<S>,
    id: Id,
    patch: GroupPatch,
  ) -> impl Future<Output = Result<()>> + Send {
    dir.update_group(id, patch)
  }

  fn delete<S: TableStore>(
    dir: &DirectoryStore<S>,
    id: Id,
  ) -> impl Future<Output = Result<()>> + Send {
    dir.delete_group(id)
  }
}

impl Resource for Band {
  const ENTITY: Entity = Entity::Band;

  type New = NewBand;
  type Patch = BandPatch;

  fn collection(snapshot: &Snapshot) -> &[Self] { &snapshot.bands }

  fn id(&self) -> Id { self.id }

  fn add<S: TableStore>(
    dir: &DirectoryStore<S>,
    input: NewBand,
  ) -> impl Future<Output = Result<Id>> + Send {
    dir.add_band(input)
  }

  fn update<S: TableStore>(
    dir: &DirectoryStore<S>,
    id: Id,
    patch: BandPatch,
  ) -> impl Future<Output = Result<()>> + Send {
    dir.update_band(id, patch)
  }

  fn delete<S: TableStore>(
    dir: &DirectoryStore<S>,
    id: Id,
  ) -> impl Future<Output = Result<()>> + Send {
    dir.delete_band(id)
  }
}

impl Resource for Member {
  const ENTITY: Entity = Entity::Member;

  type New = NewMember;
  type Patch = MemberPatch;

  fn collection(snapshot: &Snapshot) -> &[Self] { &snapshot.members }

  fn id(&self) -> Id { self.id }

  fn add<S: TableStore>(
    dir: &DirectoryStore<S>,
    input: NewMember,
  ) -> impl Future<Output = Result<Id>> + Send {
    dir.add_member(input)
  }

  fn update<S: TableStore>(
    dir: &DirectoryStore<S>,
    id: Id,
    patch: MemberPatch,
  ) -> impl Future<Output = Result<()>> + Send {
    dir.update_member(id, patch)
  }

  fn delete<S: TableStore>(
    dir: &DirectoryStore<S>,
    id: Id,
  ) -> impl Future<Output = Result<()>> + Send {
    dir.delete_member(id)
  }
}
