pub mod ids;

pub use ids::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_nil() {
        let nil = NodeID::nil();
        assert!(nil.is_nil());
        assert_eq!(nil.index(), 0);
        assert_eq!(nil.generation(), 0);
    }

    #[test]
    fn node_id_parts() {
        let id = NodeID::from_parts(5, 2);
        assert_eq!(id.index(), 5);
        assert_eq!(id.generation(), 2);
        assert!(!id.is_nil());
    }

    #[test]
    fn object_id_is_distinct_type_with_same_layout() {
        let id = ObjectID::from_parts(7, 3);
        assert_eq!(id.index(), 7);
        assert_eq!(id.generation(), 3);
        assert_eq!(ObjectID::from_u64(id.as_u64()), id);
    }

    #[test]
    fn debug_and_display_show_index_and_generation() {
        let id = NodeID::from_parts(4, 1);
        assert_eq!(format!("{id:?}"), "NodeID(4:1)");
        assert_eq!(id.to_string(), "4:1");
    }
}
