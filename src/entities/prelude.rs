pub use super::activities::Entity as Activities;
pub use super::awards::Entity as Awards;
pub use super::performances::Entity as Performances;
pub use super::profiles::Entity as Profiles;
pub use super::seasons::Entity as Seasons;
pub use super::users::Entity as Users;
