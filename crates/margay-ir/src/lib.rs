#![doc = include_str!("../README.md")]

pub mod kinematics;
pub mod lowering;
pub mod trace;

pub use kinematics::{AgentClasses, Component, KinematicsError};
pub use trace::{Binding, Delta, GridBounds, Point, State, Trace};
