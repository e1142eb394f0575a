use crate::criteria::AdministratorFilter;

use super::base::CriteriaRepository;

pub type AdministratorRepository = CriteriaRepository<AdministratorFilter>;
