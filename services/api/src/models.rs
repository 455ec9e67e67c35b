//! API models for request and response payloads

pub mod cancion;
pub mod favorito;
pub mod paginacion;
pub mod usuario;

pub use cancion::{ActualizarCancion, BusquedaCanciones, Cancion, NuevaCancion};
pub use favorito::{Favorito, FavoritoDetalle, NuevoFavorito};
pub use paginacion::{Pagina, Paginacion, Ventana};
pub use usuario::{ActualizarUsuario, NuevoUsuario, Usuario};
