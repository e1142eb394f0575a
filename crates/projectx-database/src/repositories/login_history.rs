use crate::criteria::LoginHistoryFilter;

use super::base::CriteriaRepository;

pub type LoginHistoryRepository = CriteriaRepository<LoginHistoryFilter>;
