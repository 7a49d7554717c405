pub mod city;
pub mod destination;
pub mod destination_image;
pub mod destination_tag;
