pub mod animation;
pub mod camera;
pub mod character_controller;
pub mod config;
pub mod constants;
pub mod error;
pub mod game_states;
pub mod menu;
pub mod physics;
pub mod player;
pub mod sound;
pub mod world;
