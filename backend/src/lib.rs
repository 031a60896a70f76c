pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod health;
pub mod middleware;
pub mod openapi;
pub mod third_party;

pub mod tournament {
    pub mod controller;
    pub mod error;
    pub mod repository;
    pub mod usecase;
}

pub mod registration {
    pub mod controller;
    pub mod error;
    pub mod repository;
    pub mod usecase;
}

pub mod user {
    pub mod controller;
    pub mod error;
    pub mod rate_limit;
    pub mod repository;
    pub mod usecase;
}

pub mod profile {
    pub mod controller;
    pub mod error;
    pub mod otp;
    pub mod upload;
    pub mod usecase;
}

// Unit test modules only
#[cfg(test)]
mod test_support;

#[cfg(test)]
mod tournament_tests;

#[cfg(test)]
mod registration_tests;
