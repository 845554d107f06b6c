//! Object registry - live units, buildings and wall pieces

use std::collections::BTreeMap;

use crate::core::types::{ObjectId, ObjectTypeId, PlayerId, UnitGroup};
use crate::game::catalog::ObjectCatalog;
use crate::signal::ObjectInfo;

/// All live objects, keyed by id in creation order
#[derive(Debug, Clone, Default)]
pub struct ObjectRegistry {
    objects: BTreeMap<ObjectId, ObjectInfo>,
    next_id: u32,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ObjectId) -> Option<&ObjectInfo> {
        self.objects.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectInfo> {
        self.objects.values()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects owned by `player` whose type is in `type_ids`
    pub fn count_owned(&self, player: Option<PlayerId>, type_ids: &[ObjectTypeId]) -> usize {
        self.iter()
            .filter(|o| player.map_or(true, |p| o.owner == p))
            .filter(|o| type_ids.contains(&o.type_id))
            .count()
    }

    /// Insert a new object and return its snapshot
    pub fn spawn(&mut self, catalog: &ObjectCatalog, owner: PlayerId, type_id: ObjectTypeId) -> ObjectInfo {
        self.next_id += 1;
        let info = ObjectInfo {
            id: ObjectId(self.next_id),
            type_id,
            class: catalog.class_of(type_id),
            owner,
            group: UnitGroup::Ungrouped,
        };
        self.objects.insert(info.id, info);
        info
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<ObjectInfo> {
        self.objects.remove(&id)
    }

    /// Change the owner, returns the updated snapshot and the previous owner
    pub fn set_owner(&mut self, id: ObjectId, owner: PlayerId) -> Option<(ObjectInfo, PlayerId)> {
        let object = self.objects.get_mut(&id)?;
        let old_owner = object.owner;
        object.owner = owner;
        Some((*object, old_owner))
    }

    /// Change the group, returns the updated snapshot and the previous group
    pub fn set_group(&mut self, id: ObjectId, group: UnitGroup) -> Option<(ObjectInfo, UnitGroup)> {
        let object = self.objects.get_mut(&id)?;
        let old_group = object.group;
        object.group = group;
        Some((*object, old_group))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ObjectClass;

    #[test]
    fn test_spawn_assigns_increasing_ids() {
        let catalog = ObjectCatalog::standard();
        let mut registry = ObjectRegistry::new();

        let a = registry.spawn(&catalog, PlayerId(1), ObjectTypeId(83));
        let b = registry.spawn(&catalog, PlayerId(2), ObjectTypeId(4));

        assert!(a.id < b.id);
        assert_eq!(b.class, ObjectClass::Archer);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_count_owned_filters_player_and_type() {
        let catalog = ObjectCatalog::standard();
        let mut registry = ObjectRegistry::new();
        registry.spawn(&catalog, PlayerId(1), ObjectTypeId(4));
        registry.spawn(&catalog, PlayerId(1), ObjectTypeId(24));
        registry.spawn(&catalog, PlayerId(2), ObjectTypeId(4));

        let archers = [ObjectTypeId(4), ObjectTypeId(24), ObjectTypeId(492)];
        assert_eq!(registry.count_owned(Some(PlayerId(1)), &archers), 2);
        assert_eq!(registry.count_owned(None, &archers), 3);
    }

    #[test]
    fn test_set_owner_reports_previous() {
        let catalog = ObjectCatalog::standard();
        let mut registry = ObjectRegistry::new();
        let knight = registry.spawn(&catalog, PlayerId(1), ObjectTypeId(38));

        let (updated, old) = registry.set_owner(knight.id, PlayerId(3)).unwrap();
        assert_eq!(old, PlayerId(1));
        assert_eq!(updated.owner, PlayerId(3));
        assert!(registry.set_owner(ObjectId(999), PlayerId(1)).is_none());
    }
}
