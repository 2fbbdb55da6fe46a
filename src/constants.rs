/// 每个隐藏字节占用的像素字节数。
/// 每个像素字节只承载 1 bit (最低有效位)，因此一个字节需要 8 个像素字节。
pub const BITS_PER_BYTE: u64 = 8;

/// 字节内第一个写入的位 (MSB 优先)。
pub const FIRST_BIT_MASK: u8 = 0b1000_0000;

/// 隐藏数据流的结束标记。
/// 编码器在负载之后追加一个该值的字节，解码器遇到它即停止。
pub const TERMINATOR: u8 = 0;

/// 像素值大于该阈值时通过减 1 翻转奇偶性，否则加 1，保证结果不越过 `[0, 255]`。
pub const PERTURB_DOWN_ABOVE: u8 = 127;

/// 未指定输出路径时，隐写结果图像文件名的前缀。
pub const DOCTORED_PREFIX: &str = "doctored_";

/// 进程退出码。
pub mod exit_code {
    /// 一般性错误 (文件 I/O、拒绝覆盖等)。
    pub const FAILURE: u8 = 1;
    /// 无法加载输入图像。2 留给 clap 的参数错误。
    pub const LOAD_FAILED: u8 = 3;
    /// 图像空间不足以容纳负载与结束标记。
    pub const OUT_OF_SPACE: u8 = 4;
    /// 无法保存输出图像。
    pub const SAVE_FAILED: u8 = 5;
}
