// Application layer - Use cases and the backend seam
pub mod city_api;
pub mod city_state;
