use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::SportRepository;
use crate::domain::role::Permission;
use crate::domain::sport::{Position, Sport, SportGender};
use crate::domain::user::Caller;

#[derive(Clone)]
pub struct SportService {
    repo: Arc<dyn SportRepository>,
}

fn required_name(name: &str) -> Result<&str, DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::field("name", "This field may not be blank."));
    }
    Ok(name)
}

impl SportService {
    pub fn new(repo: Arc<dyn SportRepository>) -> Self {
        Self { repo }
    }

    pub fn list(&self) -> Result<Vec<Sport>, DomainError> {
        self.repo.list()
    }

    pub fn create(&self, caller: &Caller, name: &str, gender: SportGender) -> Result<Sport, DomainError> {
        caller.require(Permission::ManageSports)?;
        self.repo.create(required_name(name)?, gender)
    }

    pub fn get(&self, id: Uuid) -> Result<Sport, DomainError> {
        self.repo.find(id)?.ok_or(DomainError::NotFound("Sport"))
    }

    /// Fields left out keep their current value.
    pub fn update(
        &self,
        caller: &Caller,
        id: Uuid,
        name: Option<&str>,
        gender: Option<SportGender>,
    ) -> Result<Sport, DomainError> {
        caller.require(Permission::ManageSports)?;
        let current = self.get(id)?;
        let name = match name {
            Some(name) => required_name(name)?,
            None => current.name.as_str(),
        };
        self.repo
            .update(id, name, gender.unwrap_or(current.gender))?
            .ok_or(DomainError::NotFound("Sport"))
    }

    pub fn delete(&self, caller: &Caller, id: Uuid) -> Result<(), DomainError> {
        caller.require(Permission::ManageSports)?;
        if !self.repo.delete(id)? {
            return Err(DomainError::NotFound("Sport"));
        }
        log::info!("Sport {} deleted by {}", id, caller.id);
        Ok(())
    }

    pub fn positions(&self, sport_id: Uuid) -> Result<Vec<Position>, DomainError> {
        self.repo
            .find(sport_id)?
            .ok_or(DomainError::NotFound("Sport"))?;
        self.repo.positions(sport_id)
    }

    pub fn create_position(&self, caller: &Caller, sport_id: Uuid, name: &str) -> Result<Position, DomainError> {
        caller.require(Permission::ManageSports)?;
        self.repo
            .find(sport_id)?
            .ok_or(DomainError::NotFound("Sport"))?;
        self.repo.create_position(sport_id, required_name(name)?)
    }

    pub fn position(&self, id: Uuid) -> Result<Position, DomainError> {
        self.repo
            .find_position(id)?
            .ok_or(DomainError::NotFound("Position"))
    }

    pub fn update_position(&self, caller: &Caller, id: Uuid, name: &str) -> Result<Position, DomainError> {
        caller.require(Permission::ManageSports)?;
        let name = required_name(name)?;
        self.repo
            .update_position(id, name)?
            .ok_or(DomainError::NotFound("Position"))
    }

    pub fn delete_position(&self, caller: &Caller, id: Uuid) -> Result<(), DomainError> {
        caller.require(Permission::ManageSports)?;
        if !self.repo.delete_position(id)? {
            return Err(DomainError::NotFound("Position"));
        }
        log::info!("Position {} deleted by {}", id, caller.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::domain::role::Role;

    /// One sport and its positions, kept in memory.
    struct OneSport {
        sport: Mutex<Sport>,
        positions: Mutex<Vec<Position>>,
    }

    impl OneSport {
        fn new() -> Self {
            let sport = Sport {
                id: Uuid::new_v4(),
                name: "Volleyball".to_string(),
                gender: SportGender::Female,
            };
            let positions = vec![Position {
                id: Uuid::new_v4(),
                sport_id: sport.id,
                name: "Setter".to_string(),
            }];
            Self {
                sport: Mutex::new(sport),
                positions: Mutex::new(positions),
            }
        }
    }

    impl SportRepository for OneSport {
        fn list(&self) -> Result<Vec<Sport>, DomainError> {
            Ok(vec![self.sport.lock().unwrap().clone()])
        }
        fn create(&self, _: &str, _: SportGender) -> Result<Sport, DomainError> {
            unimplemented!()
        }
        fn find(&self, id: Uuid) -> Result<Option<Sport>, DomainError> {
            let sport = self.sport.lock().unwrap();
            Ok(Some(sport.clone()).filter(|s| s.id == id))
        }
        fn update(&self, id: Uuid, name: &str, gender: SportGender) -> Result<Option<Sport>, DomainError> {
            let mut sport = self.sport.lock().unwrap();
            if sport.id != id {
                return Ok(None);
            }
            sport.name = name.to_string();
            sport.gender = gender;
            Ok(Some(sport.clone()))
        }
        fn delete(&self, _: Uuid) -> Result<bool, DomainError> {
            Ok(false)
        }
        fn positions(&self, _: Uuid) -> Result<Vec<Position>, DomainError> {
            Ok(self.positions.lock().unwrap().clone())
        }
        fn create_position(&self, _: Uuid, _: &str) -> Result<Position, DomainError> {
            unimplemented!()
        }
        fn find_position(&self, id: Uuid) -> Result<Option<Position>, DomainError> {
            Ok(self.positions.lock().unwrap().iter().find(|p| p.id == id).cloned())
        }
        fn update_position(&self, id: Uuid, name: &str) -> Result<Option<Position>, DomainError> {
            let mut positions = self.positions.lock().unwrap();
            Ok(positions.iter_mut().find(|p| p.id == id).map(|p| {
                p.name = name.to_string();
                p.clone()
            }))
        }
        fn delete_position(&self, id: Uuid) -> Result<bool, DomainError> {
            let mut positions = self.positions.lock().unwrap();
            let before = positions.len();
            positions.retain(|p| p.id != id);
            Ok(positions.len() < before)
        }
    }

    fn service() -> (SportService, Arc<OneSport>) {
        let repo = Arc::new(OneSport::new());
        (SportService::new(repo.clone()), repo)
    }

    fn admin() -> Caller {
        Caller::new(Uuid::new_v4(), Role::SuperAdmin)
    }

    #[test]
    fn partial_update_keeps_the_other_field() {
        let (svc, repo) = service();
        let id = repo.sport.lock().unwrap().id;

        let sport = svc.update(&admin(), id, None, Some(SportGender::Male)).unwrap();
        assert_eq!(sport.name, "Volleyball");
        assert_eq!(sport.gender, SportGender::Male);

        let sport = svc.update(&admin(), id, Some(" Beach Volleyball "), None).unwrap();
        assert_eq!(sport.name, "Beach Volleyball");
        assert_eq!(sport.gender, SportGender::Male);

        assert!(matches!(
            svc.update(&admin(), id, Some("  "), None),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            svc.update(&admin(), Uuid::new_v4(), Some("Golf"), None),
            Err(DomainError::NotFound("Sport"))
        ));
    }

    #[test]
    fn only_admins_change_sports_and_positions() {
        let (svc, repo) = service();
        let sport_id = repo.sport.lock().unwrap().id;
        let position_id = repo.positions.lock().unwrap()[0].id;
        let coach = Caller::new(Uuid::new_v4(), Role::Coach);

        assert!(matches!(
            svc.update(&coach, sport_id, Some("Handball"), None),
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            svc.update_position(&coach, position_id, "Libero"),
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            svc.delete_position(&coach, position_id),
            Err(DomainError::Forbidden(_))
        ));
        assert_eq!(svc.get(sport_id).unwrap().name, "Volleyball");
        assert_eq!(svc.position(position_id).unwrap().name, "Setter");
    }

    #[test]
    fn position_edits_and_removal() {
        let (svc, repo) = service();
        let position_id = repo.positions.lock().unwrap()[0].id;

        let renamed = svc.update_position(&admin(), position_id, "Libero").unwrap();
        assert_eq!(renamed.name, "Libero");

        svc.delete_position(&admin(), position_id).unwrap();
        assert!(matches!(
            svc.position(position_id),
            Err(DomainError::NotFound("Position"))
        ));
        assert!(matches!(
            svc.delete_position(&admin(), position_id),
            Err(DomainError::NotFound("Position"))
        ));
    }
}
