//! Unit tests for vertex_array.rs

use std::sync::Arc;

use crate::error::Error;
use crate::render::buffer::{
    BufferElement, BufferLayout, IndexBuffer, IndexBufferHandle, ShaderDataType,
};
use crate::render::handle::Handle;
use crate::render::vertex_array::{attribute_slots, resolve_index_count};

struct FixedIndexBuffer(u32);

impl IndexBuffer for FixedIndexBuffer {
    fn bind(&self) {}
    fn unbind(&self) {}
    fn count(&self) -> u32 {
        self.0
    }
}

fn index_buffer(count: u32) -> IndexBufferHandle {
    Handle::from_arc(Arc::new(FixedIndexBuffer(count)))
}

#[test]
fn test_zero_requests_whole_buffer() {
    let indices = index_buffer(6);
    assert_eq!(resolve_index_count(0, Some(&indices)).unwrap(), 6);
}

#[test]
fn test_explicit_count_is_kept() {
    let indices = index_buffer(6);
    assert_eq!(resolve_index_count(3, Some(&indices)).unwrap(), 3);
    assert_eq!(resolve_index_count(6, Some(&indices)).unwrap(), 6);
}

#[test]
fn test_count_beyond_buffer_is_rejected() {
    let indices = index_buffer(6);
    assert!(matches!(resolve_index_count(7, Some(&indices)), Err(Error::InvalidResource(_))));
}

#[test]
fn test_missing_index_buffer_is_rejected() {
    assert!(matches!(resolve_index_count(0, None), Err(Error::InvalidResource(_))));
}

#[test]
fn test_attribute_slots_follow_layout() {
    let layout = BufferLayout::new(vec![
        BufferElement::new(ShaderDataType::Float3, "a_Position"),
        BufferElement::new(ShaderDataType::Float4, "a_Color"),
        BufferElement::new(ShaderDataType::Int, "a_EntityId"),
    ]);
    let slots = attribute_slots(&layout, 0);

    assert_eq!(slots.len(), 3);
    assert_eq!(slots[0].index, 0);
    assert_eq!(slots[0].components, 3);
    assert_eq!(slots[0].offset, 0);
    assert_eq!(slots[1].index, 1);
    assert_eq!(slots[1].offset, 12);
    assert_eq!(slots[2].ty, ShaderDataType::Int);
    assert_eq!(slots[2].offset, 28);
    assert!(slots.iter().all(|slot| slot.stride == 32));
}

#[test]
fn test_matrix_takes_one_slot_per_column() {
    let layout = BufferLayout::new(vec![
        BufferElement::new(ShaderDataType::Float2, "a_Uv"),
        BufferElement::new(ShaderDataType::Mat4, "a_Transform"),
    ]);
    let slots = attribute_slots(&layout, 2);

    assert_eq!(slots.len(), 5);
    let indices: Vec<u32> = slots.iter().map(|slot| slot.index).collect();
    assert_eq!(indices, vec![2, 3, 4, 5, 6]);
    let offsets: Vec<i32> = slots[1..].iter().map(|slot| slot.offset).collect();
    assert_eq!(offsets, vec![8, 24, 40, 56]);
    assert!(slots[1..].iter().all(|slot| slot.components == 4));
}
