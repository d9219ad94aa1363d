pub mod city;
pub mod images;
pub mod parking_spot;
pub mod role;
pub mod street;
pub mod user;
