use wasm_bindgen::prelude::*;
use astrini_engine::*;

mod game;
use game::Astrini;

astrini_web::export_game!(Astrini, "earth-moon-sun");
