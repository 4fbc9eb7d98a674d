use log::debug;
use particle_id::ParticleID;

use crate::{
    config::MissingCollection,
    error::{Error, Result},
};

/// PDG code of the electron
pub(crate) const ELECTRON: i32 = 11;

/// Generator status of stable final-state particles
pub(crate) const FINAL_STATE: i32 = 1;

pub(crate) fn is_electron_like(id: ParticleID) -> bool {
    id.id().unsigned_abs() == ELECTRON.unsigned_abs()
}

/// Apply the missing-collection policy to a collection lookup
pub(crate) fn with_policy<T>(
    lookup: Result<&[T]>,
    policy: MissingCollection,
) -> Result<&[T]> {
    match lookup {
        Err(Error::MissingCollection { event, name })
            if policy == MissingCollection::Empty =>
        {
            debug!("Treating missing collection `{name}` in event {event} as empty");
            Ok(&[])
        }
        res => res,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn electrons() {
        assert!(is_electron_like(ParticleID::new(11)));
        assert!(is_electron_like(ParticleID::new(-11)));
        assert!(!is_electron_like(ParticleID::new(13)));
        assert!(!is_electron_like(ParticleID::new(22)));
        assert!(!is_electron_like(ParticleID::new(i32::MIN)));
        assert!(!is_electron_like(ParticleID::new(i32::MAX)));
    }

    #[test]
    fn policy() {
        let missing = || -> Result<&'static [i32]> {
            Err(Error::MissingCollection {
                event: 1,
                name: "Tracks".to_owned(),
            })
        };
        assert!(with_policy(missing(), MissingCollection::Error).is_err());
        assert_eq!(with_policy(missing(), MissingCollection::Empty).unwrap(), &[] as &[i32]);
        let found: Result<&[i32]> = Ok(&[1, 2]);
        assert_eq!(with_policy(found, MissingCollection::Error).unwrap(), &[1, 2]);
    }
}
