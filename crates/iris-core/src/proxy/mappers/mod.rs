// Mappers - upstream shapes -> normalized client shape

pub mod normalize;
