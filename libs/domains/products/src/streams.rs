//! Topics carrying product intents.

use stream_worker::StreamDef;

pub const CONSUMER_GROUP: &str = "products_group";
pub const DEAD_LETTER_TOPIC: &str = "dead-letter-queue";

/// `create-product`: a product to insert.
pub struct CreateProductStream;

impl StreamDef for CreateProductStream {
    const TOPIC: &'static str = "create-product";
    const CONSUMER_GROUP: &'static str = CONSUMER_GROUP;
    const DEAD_LETTER_TOPIC: &'static str = DEAD_LETTER_TOPIC;
}

/// `update-product`: a partial product to merge into an existing row.
pub struct UpdateProductStream;

impl StreamDef for UpdateProductStream {
    const TOPIC: &'static str = "update-product";
    const CONSUMER_GROUP: &'static str = CONSUMER_GROUP;
    const DEAD_LETTER_TOPIC: &'static str = DEAD_LETTER_TOPIC;
}
