mod blob_gateway;
mod store_factory;
mod url_signer;

pub use blob_gateway::{BlobGateway, NamespaceLayout};
pub use store_factory::ObjectStoreGatewayFactory;
pub use url_signer::{BaseUrlSigner, ObjectStoreUrlSigner};
