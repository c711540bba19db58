use kernel::id::Id;

pub struct ImageMarker;
pub type ImageId = Id<ImageMarker>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_id_parse() {
        let image_id = ImageId::new();
        let parsed: ImageId = image_id.to_string().parse().unwrap();
        assert_eq!(image_id, parsed);

        assert!("not-a-uuid".parse::<ImageId>().is_err());
    }
}
