pub mod pbr;
pub mod unlit;
