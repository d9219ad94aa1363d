pub use super::images::Entity as Images;
pub use super::parkirna_mesta::Entity as ParkirnaMesta;
pub use super::roles::Entity as Roles;
pub use super::slovenska_mesta::Entity as SlovenskaMesta;
pub use super::slovenske_ulice::Entity as SlovenskeUlice;
pub use super::user_data::Entity as UserData;
pub use super::users::Entity as Users;
