use crate::criteria::RoleFilter;

use super::base::CriteriaRepository;

pub type RoleRepository = CriteriaRepository<RoleFilter>;
